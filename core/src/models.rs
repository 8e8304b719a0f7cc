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

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An `(artist, title)` pair extracted from one input line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackRef {
    pub artist: String,
    pub title: String,
}

impl TrackRef {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// A ref with a blank field can never match anything on the remote side.
    pub fn is_searchable(&self) -> bool {
        !self.artist.trim().is_empty() && !self.title.trim().is_empty()
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}", self.artist, self.title)
    }
}

/// Opaque provider identifier of a track (the bare base62 id on Spotify).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of looking up one `TrackRef`. `id` is `None` when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub track: TrackRef,
    pub id: Option<TrackId>,
}

impl ResolvedTrack {
    pub fn matched(track: TrackRef, id: TrackId) -> Self {
        Self {
            track,
            id: Some(id),
        }
    }

    pub fn unmatched(track: TrackRef) -> Self {
        Self { track, id: None }
    }

    pub fn is_matched(&self) -> bool {
        self.id.is_some()
    }
}

/// Access credentials handed out by the provider after a code exchange or refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenInfo {
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at,
        }
    }

    /// True when the token runs out within `skew` of `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        self.expires_at <= now + skew
    }
}

// Keep secrets out of logs.
impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// The signed-in user, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub display_name: Option<String>,
}

impl fmt::Display for UserInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(name) => write!(f, "{} ({})", name, self.id),
            None => f.write_str(&self.id),
        }
    }
}

/// A playlist freshly created on the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
}

/// Final record of one publish run.
///
/// Built once by the publisher and never changed afterwards. `added` and
/// `unmatched` together cover every resolved track of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistOutcome {
    playlist_id: String,
    name: String,
    requested_count: usize,
    added_count: usize,
    added: Vec<ResolvedTrack>,
    unmatched: Vec<TrackRef>,
}

impl PlaylistOutcome {
    /// `requested_count` is the number of matched tracks that were meant to be
    /// inserted; `added` is clamped to it.
    pub fn new(
        playlist: &PlaylistInfo,
        requested_count: usize,
        mut added: Vec<ResolvedTrack>,
        unmatched: Vec<TrackRef>,
    ) -> Self {
        added.truncate(requested_count);
        Self {
            playlist_id: playlist.id.clone(),
            name: playlist.name.clone(),
            requested_count,
            added_count: added.len(),
            added,
            unmatched,
        }
    }

    pub fn playlist_id(&self) -> &str {
        &self.playlist_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requested_count(&self) -> usize {
        self.requested_count
    }

    pub fn added_count(&self) -> usize {
        self.added_count
    }

    pub fn added(&self) -> &[ResolvedTrack] {
        &self.added
    }

    pub fn unmatched(&self) -> &[TrackRef] {
        &self.unmatched
    }

    /// Matched tracks that never made it into the playlist.
    pub fn pending_count(&self) -> usize {
        self.requested_count - self.added_count
    }
}
