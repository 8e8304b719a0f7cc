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

use crate::error::{ConfigError, PlaylistError};
use crate::models::PlaylistOutcome;
use crate::parser;
use crate::publisher::PlaylistPublisher;
use crate::resolver::TrackResolver;
use crate::service::MusicService;
use crate::session::AuthSession;
use log::info;
use std::sync::Arc;

/// Runs the whole text-to-playlist pipeline: validate, parse, resolve, publish.
pub struct Playlister<S: ?Sized> {
    service: Arc<S>,
    resolver: TrackResolver<S>,
    publisher: PlaylistPublisher<S>,
}

impl<S: MusicService + ?Sized> Playlister<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            resolver: TrackResolver::new(Arc::clone(&service)),
            publisher: PlaylistPublisher::new(Arc::clone(&service)),
            service,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.publisher = self.publisher.with_chunk_size(chunk_size);
        self
    }

    /// Builds a playlist called `name` from `Artist – Track` lines.
    ///
    /// The session is re-validated first so a silently expired token is
    /// never used. Each stage finishes before the next one starts.
    pub async fn create_playlist(
        &self,
        session: &mut AuthSession,
        name: &str,
        text: &str,
    ) -> Result<PlaylistOutcome, PlaylistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(
                ConfigError::Invalid("playlist name must not be empty".to_string()).into(),
            );
        }

        session.validate(self.service.as_ref()).await?;

        let tracks = parser::parse(text);
        info!("Parsed {} entries", tracks.len());
        if tracks.is_empty() {
            return Err(PlaylistError::NothingToPublish);
        }

        let resolved = self.resolver.resolve(&tracks, session).await?;
        self.publisher.publish(name, &resolved, session).await
    }
}
