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

use thiserror::Error;

pub const MIN_SONGS: u32 = 10;
pub const MAX_SONGS: u32 = 30;

/// A ready-made list, handy for trying the pipeline without a generator.
pub const SAMPLE_PLAYLIST: &str = "\
Lucinda Williams – Drunken Angel
Waylon Jennings – Honky Tonk Heroes
Townes Van Zandt – Pancho and Lefty
Steve Earle – Copperhead Road
Ray Wylie Hubbard – Snake Farm
";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PromptError {
    #[error("Number of songs must be between 10 and 30, got {0}")]
    SongCount(u32),
    #[error("An anchor artist is required")]
    MissingArtist,
}

/// What to ask a text generator for. The request itself is made elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistPrompt {
    pub mood: String,
    pub genre: String,
    pub anchor_artist: String,
    pub num_songs: u32,
}

impl Default for PlaylistPrompt {
    fn default() -> Self {
        Self {
            mood: "Gritty".to_string(),
            genre: "Outlaw Country".to_string(),
            anchor_artist: "Lucinda Williams".to_string(),
            num_songs: 20,
        }
    }
}

impl PlaylistPrompt {
    pub fn validate(&self) -> Result<(), PromptError> {
        if !(MIN_SONGS..=MAX_SONGS).contains(&self.num_songs) {
            return Err(PromptError::SongCount(self.num_songs));
        }
        if self.anchor_artist.trim().is_empty() {
            return Err(PromptError::MissingArtist);
        }
        Ok(())
    }

    /// The request text. Answers come back in the format `parser::parse` reads.
    pub fn render(&self) -> Result<String, PromptError> {
        self.validate()?;

        Ok(format!(
            "Suggest {count} songs for a {mood} {genre} playlist in the spirit of {artist}.\n\
             Answer with one song per line, formatted exactly as: Artist – Track\n\
             No numbering, no commentary, no blank lines.",
            count = self.num_songs,
            mood = self.mood.trim().to_lowercase(),
            genre = self.genre.trim(),
            artist = self.anchor_artist.trim(),
        ))
    }
}
