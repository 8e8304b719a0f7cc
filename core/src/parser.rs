/*
    gptune-rs | Rust CLI tool to turn "Artist – Track" lists into Spotify playlists.
    Copyright (C) 2025  Israel Alberto Roldan Vega

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::models::TrackRef;

/// Separators tried before falling back to a plain hyphen.
const DASHES: [char; 2] = ['–', '—'];
const HYPHEN: char = '-';

/// Extracts `Artist – Track` pairs from freeform text, one per line.
///
/// Each line is split at the first en/em dash, or at the first hyphen when it
/// has no dash. Lines with no separator at all are skipped. Both halves are
/// trimmed; a half may come out empty, and it is up to the resolver to treat
/// such a pair as unresolvable.
pub fn parse(text: &str) -> Vec<TrackRef> {
    text.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<TrackRef> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (artist, title) = line
        .split_once(DASHES)
        .or_else(|| line.split_once(HYPHEN))?;

    Some(TrackRef::new(artist.trim(), title.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_separators() {
        let refs = parse("A – B\nC - D");
        assert_eq!(refs, vec![TrackRef::new("A", "B"), TrackRef::new("C", "D")]);
    }

    #[test]
    fn test_parse_splits_on_first_dash_only() {
        let refs = parse("Artist – Title – Extra");
        assert_eq!(refs, vec![TrackRef::new("Artist", "Title – Extra")]);
    }

    #[test]
    fn test_dash_wins_over_earlier_hyphen() {
        let refs = parse("Jay-Z — 99 Problems");
        assert_eq!(refs, vec![TrackRef::new("Jay-Z", "99 Problems")]);
    }

    #[test]
    fn test_lines_without_separator_are_skipped() {
        let text = "Here is your playlist:\n\nLucinda Williams – Drunken Angel\nEnjoy!";
        let refs = parse(text);
        assert_eq!(refs, vec![TrackRef::new("Lucinda Williams", "Drunken Angel")]);
    }

    #[test]
    fn test_empty_halves_are_kept() {
        let refs = parse(" – Lonely Title\nLonely Artist -   ");
        assert_eq!(
            refs,
            vec![
                TrackRef::new("", "Lonely Title"),
                TrackRef::new("Lonely Artist", ""),
            ]
        );
    }

    #[test]
    fn test_windows_line_endings_and_padding() {
        let refs = parse("  Waylon Jennings –  Honky Tonk Heroes  \r\nSteve Earle - Copperhead Road\r\n");
        assert_eq!(
            refs,
            vec![
                TrackRef::new("Waylon Jennings", "Honky Tonk Heroes"),
                TrackRef::new("Steve Earle", "Copperhead Road"),
            ]
        );
    }

    #[test]
    fn test_parse_is_idempotent_and_ordered() {
        let text = "Townes Van Zandt – Pancho and Lefty\nRay Wylie Hubbard – Snake Farm";
        let first = parse(text);
        assert_eq!(first, parse(text));
        assert_eq!(first[0].artist, "Townes Van Zandt");
        assert_eq!(first[1].artist, "Ray Wylie Hubbard");
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n   \n").is_empty());
    }
}
