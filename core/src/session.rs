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

use crate::error::{ConfigError, PlaylistError, ServiceError};
use crate::models::TokenInfo;
use crate::service::{AuthorizeParams, MusicService};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;

/// Tokens this close to expiry are treated as already expired.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Where a session stands in the authorization round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(TokenInfo),
    Expired,
}

/// Owns the token and decides when it may be used.
///
/// Transitions:
///
/// * `Unauthenticated` or `Expired` + code exchanged => `Authenticated`
/// * `Authenticated` + failed validation (and failed refresh) => `Expired`
/// * `Expired` + `begin_authorization` => `Unauthenticated`
///
/// Only an `Authenticated` session hands out its token. Network calls all go
/// through the `MusicService` passed in; the session just tracks state.
#[derive(Debug)]
pub struct AuthSession {
    params: AuthorizeParams,
    state: SessionState,
    consumed_codes: HashSet<String>,
}

impl AuthSession {
    pub fn new(params: AuthorizeParams) -> Self {
        Self {
            params,
            state: SessionState::Unauthenticated,
            consumed_codes: HashSet::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, SessionState::Authenticated(_))
    }

    /// Returns the URL where the user grants access. An expired session
    /// drops back to `Unauthenticated` to wait for the new code.
    pub fn begin_authorization<S>(&mut self, service: &S) -> Result<String, PlaylistError>
    where
        S: MusicService + ?Sized,
    {
        if self.params.client_id.is_empty() || self.params.redirect_uri.is_empty() {
            return Err(ConfigError::Invalid(
                "client id and redirect URI must be set".to_string(),
            )
            .into());
        }

        let url = service
            .authorize_url(&self.params)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.state == SessionState::Expired {
            self.state = SessionState::Unauthenticated;
        }

        Ok(url)
    }

    /// Exchanges a one-time authorization code for a token.
    ///
    /// A code is never sent twice: a code this session has already consumed
    /// fails straight away, and a failed exchange is not retried.
    pub async fn receive_code<S>(
        &mut self,
        service: &S,
        code: &str,
    ) -> Result<&TokenInfo, PlaylistError>
    where
        S: MusicService + ?Sized,
    {
        let code = code.trim();
        if code.is_empty() {
            return Err(PlaylistError::AuthExchangeFailed(ServiceError::Rejected(
                "empty authorization code".to_string(),
            )));
        }

        if !self.consumed_codes.insert(code.to_string()) {
            warn!("Authorization code was already used, start a new authorization");
            return Err(PlaylistError::AuthExchangeFailed(ServiceError::Rejected(
                "authorization code already used".to_string(),
            )));
        }

        match service.exchange_code(code).await {
            Ok(token) => {
                info!("Authorization code exchanged, session authenticated");
                self.state = SessionState::Authenticated(token);
                self.token()
            }
            Err(e) => {
                warn!("Authorization code exchange failed: {}", e);
                if self.state == SessionState::Expired {
                    self.state = SessionState::Unauthenticated;
                }
                Err(PlaylistError::AuthExchangeFailed(e))
            }
        }
    }

    /// Confirms the token still works before it is used.
    ///
    /// A rejected token is refreshed once when a refresh token is available;
    /// otherwise the session moves to `Expired`. Calling this again without
    /// anything changing in between yields the same state.
    pub async fn validate<S>(&mut self, service: &S) -> Result<&TokenInfo, PlaylistError>
    where
        S: MusicService + ?Sized,
    {
        self.validate_at(service, Utc::now()).await
    }

    async fn validate_at<S>(
        &mut self,
        service: &S,
        now: DateTime<Utc>,
    ) -> Result<&TokenInfo, PlaylistError>
    where
        S: MusicService + ?Sized,
    {
        let current = match &self.state {
            SessionState::Authenticated(token) => token.clone(),
            _ => return Err(PlaylistError::NotAuthenticated),
        };

        let skew = Duration::seconds(EXPIRY_SKEW_SECS);
        if !current.is_expired_at(now, skew) && service.validate(&current).await {
            debug!("Token still valid until {}", current.expires_at);
            return self.token();
        }

        if let Some(refresh_token) = current.refresh_token.as_deref() {
            match service.refresh(refresh_token).await {
                Ok(mut renewed) if !renewed.is_expired_at(now, skew) => {
                    if renewed.refresh_token.is_none() {
                        renewed.refresh_token = current.refresh_token.clone();
                    }
                    info!("Token refreshed, valid until {}", renewed.expires_at);
                    self.state = SessionState::Authenticated(renewed);
                    return self.token();
                }
                Ok(_) => warn!("Refreshed token is already expired"),
                Err(e) => warn!("Token refresh failed: {}", e),
            }
        }

        info!("Session expired, authorization required");
        self.state = SessionState::Expired;
        Err(PlaylistError::NotAuthenticated)
    }

    /// The token, only while authenticated.
    pub fn token(&self) -> Result<&TokenInfo, PlaylistError> {
        match &self.state {
            SessionState::Authenticated(token) => Ok(token),
            _ => Err(PlaylistError::NotAuthenticated),
        }
    }

    pub fn sign_out(&mut self) {
        self.state = SessionState::Unauthenticated;
    }
}
