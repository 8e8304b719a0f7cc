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
use crate::models::{PlaylistInfo, TokenInfo, TrackId, UserInfo};
use crate::service::{AuthorizeParams, MusicService, TrackQuery};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ExchangeCode(String),
    Refresh(String),
    Validate,
    CurrentUser,
    CreatePlaylist {
        user_id: String,
        name: String,
        public: bool,
    },
    Search(TrackQuery),
    AddTracks {
        playlist_id: String,
        ids: Vec<TrackId>,
    },
}

/// In-memory `MusicService` for unit tests.
///
/// Records every call and answers from its switches.
///
/// Searches hit by default, returning `id-<title slug>`.
#[derive(Default)]
pub struct MockService {
    calls: Mutex<Vec<Call>>,
    reject_codes: bool,
    invalid_tokens: bool,
    reject_refresh: bool,
    stale_refresh: bool,
    without_refresh_token: bool,
    fail_user: bool,
    fail_create: bool,
    fail_add_call: Option<usize>,
    misses: HashSet<String>,
    failures: HashSet<String>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_codes(mut self) -> Self {
        self.reject_codes = true;
        self
    }

    pub fn invalid_tokens(mut self) -> Self {
        self.invalid_tokens = true;
        self
    }

    pub fn reject_refresh(mut self) -> Self {
        self.reject_refresh = true;
        self
    }

    /// Refresh succeeds but hands back a token that has already run out.
    pub fn stale_refresh(mut self) -> Self {
        self.stale_refresh = true;
        self
    }

    pub fn without_refresh_token(mut self) -> Self {
        self.without_refresh_token = true;
        self
    }

    pub fn fail_user(mut self) -> Self {
        self.fail_user = true;
        self
    }

    pub fn fail_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// Fails the add call with this zero-based index.
    pub fn fail_add_call(mut self, index: usize) -> Self {
        self.fail_add_call = Some(index);
        self
    }

    /// Searches for this title find nothing.
    pub fn miss(mut self, title: &str) -> Self {
        self.misses.insert(title.to_string());
        self
    }

    /// Searches for this title return an error.
    pub fn fail_search(mut self, title: &str) -> Self {
        self.failures.insert(title.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<TrackQuery> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Search(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    pub fn add_batches(&self) -> Vec<Vec<TrackId>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::AddTracks { ids, .. } => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::CreatePlaylist { .. }))
            .count()
    }

    pub fn id_for(title: &str) -> TrackId {
        TrackId::new(format!("id-{}", title.to_lowercase().replace(' ', "-")))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn rejected(what: &str) -> ServiceError {
        ServiceError::Rejected(what.to_string())
    }
}

#[async_trait]
impl MusicService for MockService {
    fn authorize_url(&self, params: &AuthorizeParams) -> Result<String, ServiceError> {
        Ok(format!(
            "https://accounts.example.com/authorize?client_id={}&redirect_uri={}&scope={}",
            params.client_id,
            params.redirect_uri,
            params.scopes.join("+")
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, ServiceError> {
        self.record(Call::ExchangeCode(code.to_string()));
        if self.reject_codes {
            return Err(Self::rejected("invalid_grant"));
        }

        let refresh = (!self.without_refresh_token).then(|| "refresh-1".to_string());
        Ok(TokenInfo::new(
            "access-1",
            refresh,
            Utc::now() + Duration::hours(1),
        ))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo, ServiceError> {
        self.record(Call::Refresh(refresh_token.to_string()));
        if self.reject_refresh {
            return Err(Self::rejected("refresh token revoked"));
        }

        let lifetime = if self.stale_refresh {
            Duration::hours(-1)
        } else {
            Duration::hours(1)
        };
        Ok(TokenInfo::new("access-refreshed", None, Utc::now() + lifetime))
    }

    async fn validate(&self, _token: &TokenInfo) -> bool {
        self.record(Call::Validate);
        !self.invalid_tokens
    }

    async fn current_user(&self, _token: &TokenInfo) -> Result<UserInfo, ServiceError> {
        self.record(Call::CurrentUser);
        if self.fail_user {
            return Err(Self::rejected("user lookup failed"));
        }

        Ok(UserInfo {
            id: "user-1".to_string(),
            display_name: Some("Test User".to_string()),
        })
    }

    async fn create_playlist(
        &self,
        _token: &TokenInfo,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistInfo, ServiceError> {
        self.record(Call::CreatePlaylist {
            user_id: user_id.to_string(),
            name: name.to_string(),
            public,
        });
        if self.fail_create {
            return Err(Self::rejected("playlist creation failed"));
        }

        Ok(PlaylistInfo {
            id: "playlist-1".to_string(),
            name: name.to_string(),
        })
    }

    async fn search_track(
        &self,
        _token: &TokenInfo,
        query: &TrackQuery,
    ) -> Result<Option<TrackId>, ServiceError> {
        self.record(Call::Search(query.clone()));
        if self.failures.contains(&query.title) {
            return Err(Self::rejected("search failed"));
        }
        if self.misses.contains(&query.title) {
            return Ok(None);
        }

        Ok(Some(Self::id_for(&query.title)))
    }

    async fn add_tracks(
        &self,
        _token: &TokenInfo,
        playlist_id: &str,
        ids: &[TrackId],
    ) -> Result<(), ServiceError> {
        let index = self.add_batches().len();
        self.record(Call::AddTracks {
            playlist_id: playlist_id.to_string(),
            ids: ids.to_vec(),
        });
        if self.fail_add_call == Some(index) {
            return Err(Self::rejected("add failed"));
        }

        Ok(())
    }
}
