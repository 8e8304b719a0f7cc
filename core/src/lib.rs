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

pub mod error;
pub mod models;
pub mod parser;
pub mod playlister;
pub mod prompt;
pub mod publisher;
pub mod resolver;
pub mod service;
pub mod session;
pub mod spotify;

#[cfg(test)]
mod testing;

// Re-export key items for convenience
pub use error::{ConfigError, PlaylistError, PublishStatus, ServiceError};
pub use models::{PlaylistOutcome, ResolvedTrack, TokenInfo, TrackId, TrackRef};
pub use parser::parse;
pub use playlister::Playlister;
pub use prompt::{PlaylistPrompt, SAMPLE_PLAYLIST};
pub use publisher::{PlaylistPublisher, MAX_TRACKS_PER_ADD};
pub use resolver::TrackResolver;
pub use service::{AuthorizeParams, MusicService, TrackQuery};
pub use session::{AuthSession, SessionState};
pub use spotify::SpotifyService;
