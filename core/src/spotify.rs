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

use crate::error::{ConfigError, ServiceError};
use crate::models::{PlaylistInfo, TokenInfo, TrackId, UserInfo};
use crate::service::{AuthorizeParams, MusicService, TrackQuery};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use rspotify::{
    model::{
        PlayableId, PlaylistId, SearchResult, SearchType, TrackId as SpotifyTrackId, UserId,
    },
    prelude::*,
    scopes, AuthCodeSpotify, Config, Credentials, OAuth, Token,
};
use url::Url;

/// Lifetime assumed for tokens the provider returns without an expiry.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// `MusicService` backed by the Spotify Web API (Authorization Code Flow).
///
/// No token is kept here: every call builds a throwaway client around the
/// token the caller passes in, so the session remains the only owner of
/// credentials.
pub struct SpotifyService {
    creds: Credentials,
    oauth: OAuth,
}

impl SpotifyService {
    pub fn new(creds: Credentials, oauth: OAuth) -> Self {
        Self { creds, oauth }
    }

    /// Reads `RSPOTIFY_CLIENT_ID`, `RSPOTIFY_CLIENT_SECRET` and
    /// `RSPOTIFY_REDIRECT_URI` from the environment (or a `.env` file).
    pub fn from_env() -> Result<Self, ConfigError> {
        let creds = Credentials::from_env().ok_or_else(|| {
            ConfigError::Missing("RSPOTIFY_CLIENT_ID or RSPOTIFY_CLIENT_SECRET".to_string())
        })?;

        // - playlist-modify-public: the playlist is created public.
        // - playlist-modify-private: lets the same grant cover private playlists.
        let scopes = scopes!("playlist-modify-public", "playlist-modify-private");

        let oauth = OAuth::from_env(scopes)
            .ok_or_else(|| ConfigError::Missing("RSPOTIFY_REDIRECT_URI".to_string()))?;

        Ok(Self::new(creds, oauth))
    }

    /// The configured client id, redirect URI and scopes.
    pub fn authorize_params(&self) -> AuthorizeParams {
        let mut scopes: Vec<String> = self.oauth.scopes.iter().cloned().collect();
        scopes.sort();

        AuthorizeParams {
            client_id: self.creds.id.clone(),
            redirect_uri: self.oauth.redirect_uri.clone(),
            scopes,
        }
    }

    /// Opens the browser on `url` (printing it if that fails) and reads the
    /// redirect URL back from stdin, returning the authorization code in it.
    pub fn prompt_for_code(&self, url: &str) -> Result<String, ServiceError> {
        Ok(self.base_client().get_code_from_user(url)?)
    }

    /// Extracts the authorization code from a redirect URL.
    pub fn parse_redirect(&self, redirect_url: &str) -> Option<String> {
        self.base_client().parse_response_code(redirect_url)
    }

    fn client_config() -> Config {
        // Token caching and refreshing are owned by the session.
        Config {
            token_cached: false,
            token_refreshing: false,
            ..Default::default()
        }
    }

    fn base_client(&self) -> AuthCodeSpotify {
        AuthCodeSpotify::with_config(
            self.creds.clone(),
            self.oauth.clone(),
            Self::client_config(),
        )
    }

    fn client_for(&self, token: &TokenInfo) -> AuthCodeSpotify {
        AuthCodeSpotify::from_token_with_config(
            to_spotify_token(token, &self.oauth, Utc::now()),
            self.creds.clone(),
            self.oauth.clone(),
            Self::client_config(),
        )
    }
}

#[async_trait]
impl MusicService for SpotifyService {
    fn authorize_url(&self, params: &AuthorizeParams) -> Result<String, ServiceError> {
        let creds = Credentials {
            id: params.client_id.clone(),
            ..self.creds.clone()
        };
        let oauth = OAuth {
            redirect_uri: params.redirect_uri.clone(),
            scopes: params.scopes.iter().cloned().collect(),
            ..self.oauth.clone()
        };

        let client = AuthCodeSpotify::with_config(creds, oauth, Self::client_config());
        normalize_authorize_url(&client.get_authorize_url(false)?)
    }

    async fn exchange_code(&self, code: &str) -> Result<TokenInfo, ServiceError> {
        let client = self.base_client();
        client.request_token(code).await?;
        stored_token(&client).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenInfo, ServiceError> {
        let seed = Token {
            refresh_token: Some(refresh_token.to_string()),
            ..Default::default()
        };
        let client = AuthCodeSpotify::from_token_with_config(
            seed,
            self.creds.clone(),
            self.oauth.clone(),
            Self::client_config(),
        );
        client.refresh_token().await?;
        stored_token(&client).await
    }

    async fn validate(&self, token: &TokenInfo) -> bool {
        if token.is_expired_at(Utc::now(), Duration::zero()) {
            return false;
        }

        match self.client_for(token).current_user().await {
            Ok(_) => true,
            Err(e) => {
                debug!("Token rejected by Spotify: {}", e);
                false
            }
        }
    }

    async fn current_user(&self, token: &TokenInfo) -> Result<UserInfo, ServiceError> {
        let user = self.client_for(token).current_user().await?;

        Ok(UserInfo {
            id: user.id.id().to_string(),
            display_name: user.display_name,
        })
    }

    async fn create_playlist(
        &self,
        token: &TokenInfo,
        user_id: &str,
        name: &str,
        public: bool,
    ) -> Result<PlaylistInfo, ServiceError> {
        let user = UserId::from_id(user_id).map_err(|_| ServiceError::InvalidId {
            kind: "user",
            id: user_id.to_string(),
        })?;

        let playlist = self
            .client_for(token)
            .user_playlist_create(user, name, Some(public), Some(false), None)
            .await?;

        Ok(PlaylistInfo {
            id: playlist.id.id().to_string(),
            name: playlist.name,
        })
    }

    async fn search_track(
        &self,
        token: &TokenInfo,
        query: &TrackQuery,
    ) -> Result<Option<TrackId>, ServiceError> {
        let result = self
            .client_for(token)
            .search(
                &query.to_search_string(),
                SearchType::Track,
                None,
                None,
                Some(1),
                None,
            )
            .await?;

        match result {
            SearchResult::Tracks(page) => Ok(page
                .items
                .into_iter()
                .find_map(|track| track.id)
                .map(|id| TrackId::new(id.id()))),
            _ => Ok(None),
        }
    }

    async fn add_tracks(
        &self,
        token: &TokenInfo,
        playlist_id: &str,
        ids: &[TrackId],
    ) -> Result<(), ServiceError> {
        let playlist = PlaylistId::from_id(playlist_id).map_err(|_| ServiceError::InvalidId {
            kind: "playlist",
            id: playlist_id.to_string(),
        })?;

        let items = ids
            .iter()
            .map(|id| {
                SpotifyTrackId::from_id(id.as_str())
                    .map(|track| PlayableId::Track(track.into_static()))
                    .map_err(|_| ServiceError::InvalidId {
                        kind: "track",
                        id: id.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.client_for(token)
            .playlist_add_items(playlist, items, None)
            .await?;

        Ok(())
    }
}

/// Re-emits the query sorted by key, with scopes in sorted order, so equal
/// params always give the same URL.
fn normalize_authorize_url(raw: &str) -> Result<String, ServiceError> {
    let mut url = Url::parse(raw)?;
    let mut pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

    for (key, value) in pairs.iter_mut() {
        if key == "scope" {
            let sorted = {
                let mut scopes: Vec<&str> = value.split_whitespace().collect();
                scopes.sort_unstable();
                scopes.join(" ")
            };
            *value = sorted;
        }
    }
    pairs.sort();

    url.query_pairs_mut().clear().extend_pairs(&pairs);
    Ok(url.to_string())
}

async fn stored_token(client: &AuthCodeSpotify) -> Result<TokenInfo, ServiceError> {
    let guard = client
        .token
        .lock()
        .await
        .map_err(|_| ServiceError::MissingToken)?;

    guard
        .as_ref()
        .map(|token| to_token_info(token, Utc::now()))
        .ok_or(ServiceError::MissingToken)
}

fn to_token_info(token: &Token, now: DateTime<Utc>) -> TokenInfo {
    let expires_at = token
        .expires_at
        .unwrap_or_else(|| now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));

    TokenInfo::new(
        token.access_token.clone(),
        token.refresh_token.clone(),
        expires_at,
    )
}

fn to_spotify_token(token: &TokenInfo, oauth: &OAuth, now: DateTime<Utc>) -> Token {
    Token {
        access_token: token.access_token.clone(),
        refresh_token: token.refresh_token.clone(),
        expires_at: Some(token.expires_at),
        expires_in: (token.expires_at - now).max(Duration::zero()),
        scopes: oauth.scopes.clone(),
    }
}
