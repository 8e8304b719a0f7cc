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

use crate::models::PlaylistOutcome;
use thiserror::Error;

/// Faults raised by a `MusicService` implementation.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Spotify API error: {0}")]
    Spotify(#[from] rspotify::ClientError),
    #[error("Invalid {kind} ID: {id}")]
    InvalidId { kind: &'static str, id: String },
    #[error("Malformed provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Provider returned no token")]
    MissingToken,
    #[error("Provider rejected the request: {0}")]
    Rejected(String),
}

/// Missing or malformed client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything that can stop a playlist from being built.
///
/// The first five variants mean nothing changed on the remote side, so the
/// whole operation may simply be run again. `PlaylistCreateFailed` and
/// `ChunkAddFailed` mean remote state may already have changed.
#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Authorization code exchange failed: {0}")]
    AuthExchangeFailed(#[source] ServiceError),
    #[error("Not authenticated, authorize again to continue")]
    NotAuthenticated,
    #[error("None of the tracks could be found, nothing to publish")]
    NothingToPublish,
    #[error("Could not look up the current user: {0}")]
    UserLookupFailed(#[source] ServiceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Playlist creation failed, check your account manually: {0}")]
    PlaylistCreateFailed(#[source] ServiceError),
    #[error(
        "Adding tracks failed at batch {chunk_index} after {} of {} tracks: {source}",
        .outcome.added_count(),
        .outcome.requested_count()
    )]
    ChunkAddFailed {
        outcome: Box<PlaylistOutcome>,
        chunk_index: usize,
        #[source]
        source: ServiceError,
    },
}

impl PlaylistError {
    /// True when nothing happened remotely and the operation can be repeated as is.
    pub fn is_retry_safe(&self) -> bool {
        !matches!(
            self,
            PlaylistError::PlaylistCreateFailed(_) | PlaylistError::ChunkAddFailed { .. }
        )
    }

    /// The partial outcome of a run that stopped mid-way through adding tracks.
    pub fn partial_outcome(&self) -> Option<&PlaylistOutcome> {
        match self {
            PlaylistError::ChunkAddFailed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

/// What a user should be told about a finished (or failed) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    /// Every matched track was added.
    Complete,
    /// The playlist exists and holds some, but not all, matched tracks.
    CreatedWithPartialTracks,
    /// The playlist exists but no track could be added.
    CreatedButEmpty,
    /// Nothing was created, or creation state is unknown.
    NotCreated,
}

impl PublishStatus {
    pub fn from_result(result: &Result<PlaylistOutcome, PlaylistError>) -> Self {
        match result {
            Ok(outcome) if outcome.added_count() == 0 => PublishStatus::CreatedButEmpty,
            Ok(outcome) if outcome.pending_count() > 0 => PublishStatus::CreatedWithPartialTracks,
            Ok(_) => PublishStatus::Complete,
            Err(e) => match e.partial_outcome() {
                Some(outcome) if outcome.added_count() > 0 => {
                    PublishStatus::CreatedWithPartialTracks
                }
                Some(_) => PublishStatus::CreatedButEmpty,
                None => PublishStatus::NotCreated,
            },
        }
    }
}
