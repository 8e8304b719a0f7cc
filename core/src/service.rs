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

use crate::error::ServiceError;
use crate::models::{PlaylistInfo, TokenInfo, TrackId, TrackRef, UserInfo};
use async_trait::async_trait;

/// Inputs of the provider's authorization URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeParams {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

/// Field-filtered search for a single track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackQuery {
    pub artist: String,
    pub title: String,
}

impl TrackQuery {
    pub fn from_ref(track: &TrackRef) -> Self {
        Self {
            artist: track.artist.trim().to_string(),
            title: track.title.trim().to_string(),
        }
    }

    /// Renders `track:"<title>" artist:"<artist>"`.
    pub fn to_search_string(&self) -> String {
        format!(
            "track:\"{}\" artist:\"{}\"",
            self.title.replace('"', ""),
            self.artist.replace('"', "")
        )
    }
}

/// Remote music service operations needed to build a playlist.
///
/// Implementations do one round trip per call and never retry.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// URL the user must visit to grant access.
    fn authorize_url(&self, params: &AuthorizeParams) -> Result<String, ServiceError>;

    /// Trades a one-time authorization code for a token.
    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, ServiceError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo, ServiceError>;

    /// True when the provider still accepts `token`.
    async fn validate(&self, token: &TokenInfo) -> bool;

    async fn current_user(&self, token: &TokenInfo) -> Result<UserInfo, ServiceError>;

    async fn create_playlist(
        &self,
        token: &TokenInfo,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistInfo, ServiceError>;

    /// First matching track, if any.
    async fn search_track(
        &self,
        token: &TokenInfo,
        query: &TrackQuery,
    ) -> Result<Option<TrackId>, ServiceError>;

    /// Appends `ids` to the playlist. Callers keep batches within the provider limit.
    async fn add_tracks(
        &self,
        token: &TokenInfo,
        playlist_id: &str,
        ids: &[TrackId],
    ) -> Result<(), ServiceError>;
}
