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

use crate::error::PlaylistError;
use crate::models::{PlaylistOutcome, ResolvedTrack, TrackId, TrackRef};
use crate::service::MusicService;
use crate::session::AuthSession;
use log::{debug, info, warn};
use std::sync::Arc;

/// Most track ids Spotify accepts in a single add-items call.
pub const MAX_TRACKS_PER_ADD: usize = 100;

/// Creates the playlist and fills it in provider-sized batches.
pub struct PlaylistPublisher<S: ?Sized> {
    service: Arc<S>,
    chunk_size: usize,
}

impl<S: MusicService + ?Sized> PlaylistPublisher<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            chunk_size: MAX_TRACKS_PER_ADD,
        }
    }

    /// Smaller batches; clamped to `1..=MAX_TRACKS_PER_ADD`.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.clamp(1, MAX_TRACKS_PER_ADD);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Creates a public playlist called `name` and adds every matched track.
    ///
    /// Nothing is created when no track matched. Batches go out one at a time
    /// and in order; the first failing batch ends the run with
    /// `ChunkAddFailed`, carrying what was added before it.
    pub async fn publish(
        &self,
        name: &str,
        resolved: &[ResolvedTrack],
        session: &AuthSession,
    ) -> Result<PlaylistOutcome, PlaylistError> {
        let token = session.token()?;

        let (matched, unmatched) = split_matches(resolved);
        if matched.is_empty() {
            return Err(PlaylistError::NothingToPublish);
        }

        let user = self
            .service
            .current_user(token)
            .await
            .map_err(PlaylistError::UserLookupFailed)?;

        let playlist = self
            .service
            .create_playlist(token, &user.id, name, true)
            .await
            .map_err(PlaylistError::PlaylistCreateFailed)?;
        info!(
            "Created playlist '{}' ({}) for {}",
            playlist.name, playlist.id, user
        );

        let requested = matched.len();
        let mut added: Vec<ResolvedTrack> = Vec::with_capacity(requested);

        for (i, chunk) in matched.chunks(self.chunk_size).enumerate() {
            let ids: Vec<TrackId> = chunk.iter().map(|(_, id)| id.clone()).collect();

            if let Err(e) = self.service.add_tracks(token, &playlist.id, &ids).await {
                warn!(
                    "Batch {} failed after {} of {} tracks were added: {}",
                    i,
                    added.len(),
                    requested,
                    e
                );
                let outcome = PlaylistOutcome::new(&playlist, requested, added, unmatched);
                return Err(PlaylistError::ChunkAddFailed {
                    outcome: Box::new(outcome),
                    chunk_index: i,
                    source: e,
                });
            }

            debug!("Batch {} added {} tracks", i, ids.len());
            added.extend(
                chunk
                    .iter()
                    .map(|(track, id)| ResolvedTrack::matched(track.clone(), id.clone())),
            );
        }

        info!(
            "Added {} tracks to '{}', {} unmatched",
            added.len(),
            playlist.name,
            unmatched.len()
        );

        Ok(PlaylistOutcome::new(&playlist, requested, added, unmatched))
    }
}

fn split_matches(resolved: &[ResolvedTrack]) -> (Vec<(TrackRef, TrackId)>, Vec<TrackRef>) {
    let mut matched = Vec::new();
    let mut unmatched = Vec::new();

    for entry in resolved {
        match &entry.id {
            Some(id) => matched.push((entry.track.clone(), id.clone())),
            None => unmatched.push(entry.track.clone()),
        }
    }

    (matched, unmatched)
}
