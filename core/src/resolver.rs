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
use crate::models::{ResolvedTrack, TokenInfo, TrackRef};
use crate::service::{MusicService, TrackQuery};
use crate::session::AuthSession;
use log::{debug, info, warn};
use std::sync::Arc;

/// Looks up provider track ids for parsed `TrackRef`s.
pub struct TrackResolver<S: ?Sized> {
    service: Arc<S>,
}

impl<S: MusicService + ?Sized> TrackResolver<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Resolves every ref in order, one search at a time.
    ///
    /// Misses and failed searches become unmatched entries; only a session
    /// without a usable token makes the whole call fail.
    pub async fn resolve(
        &self,
        tracks: &[TrackRef],
        session: &AuthSession,
    ) -> Result<Vec<ResolvedTrack>, PlaylistError> {
        let token = session.token()?;
        if token.access_token.is_empty() {
            return Err(PlaylistError::NotAuthenticated);
        }

        let mut resolved = Vec::with_capacity(tracks.len());
        for track in tracks {
            resolved.push(self.resolve_one(token, track).await);
        }

        let matched = resolved.iter().filter(|r| r.is_matched()).count();
        info!("Resolved {} of {} tracks", matched, resolved.len());

        Ok(resolved)
    }

    async fn resolve_one(&self, token: &TokenInfo, track: &TrackRef) -> ResolvedTrack {
        if !track.is_searchable() {
            debug!("Skipping search for incomplete entry '{}'", track);
            return ResolvedTrack::unmatched(track.clone());
        }

        let query = TrackQuery::from_ref(track);
        match self.service.search_track(token, &query).await {
            Ok(Some(id)) => {
                debug!("Matched '{}' -> {}", track, id);
                ResolvedTrack::matched(track.clone(), id)
            }
            Ok(None) => {
                debug!("No match for '{}'", track);
                ResolvedTrack::unmatched(track.clone())
            }
            Err(e) => {
                warn!("Search for '{}' failed: {}", track, e);
                ResolvedTrack::unmatched(track.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::AuthorizeParams;
    use crate::testing::MockService;

    async fn session(service: &MockService) -> AuthSession {
        let mut session = AuthSession::new(AuthorizeParams {
            client_id: "client".to_string(),
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            scopes: Vec::new(),
        });
        session.receive_code(service, "code").await.unwrap();
        session
    }

    fn refs() -> Vec<TrackRef> {
        vec![
            TrackRef::new("Lucinda Williams", "Drunken Angel"),
            TrackRef::new("Waylon Jennings", "Honky Tonk Heroes"),
            TrackRef::new("Steve Earle", "Copperhead Road"),
        ]
    }

    #[tokio::test]
    async fn test_resolves_in_input_order() {
        let service = Arc::new(MockService::new());
        let session = session(&service).await;
        let resolver = TrackResolver::new(Arc::clone(&service));

        let resolved = resolver.resolve(&refs(), &session).await.unwrap();

        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].track, refs()[0]);
        assert_eq!(resolved[2].id, Some(MockService::id_for("Copperhead Road")));
        assert_eq!(service.searches().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_search_does_not_stop_later_tracks() {
        let service = Arc::new(MockService::new().fail_search("Drunken Angel"));
        let session = session(&service).await;
        let resolver = TrackResolver::new(Arc::clone(&service));

        let resolved = resolver.resolve(&refs(), &session).await.unwrap();

        assert!(!resolved[0].is_matched());
        assert!(resolved[1].is_matched());
        assert!(resolved[2].is_matched());
        assert_eq!(service.searches().len(), 3);
    }

    #[tokio::test]
    async fn test_miss_is_recorded_as_unmatched() {
        let service = Arc::new(MockService::new().miss("Honky Tonk Heroes"));
        let session = session(&service).await;
        let resolver = TrackResolver::new(Arc::clone(&service));

        let resolved = resolver.resolve(&refs(), &session).await.unwrap();

        assert_eq!(resolved[1], ResolvedTrack::unmatched(refs()[1].clone()));
        assert!(resolved[2].is_matched());
    }

    #[tokio::test]
    async fn test_incomplete_refs_are_not_searched() {
        let service = Arc::new(MockService::new());
        let session = session(&service).await;
        let resolver = TrackResolver::new(Arc::clone(&service));
        let tracks = vec![
            TrackRef::new("", "Snake Farm"),
            TrackRef::new("Ray Wylie Hubbard", " "),
            TrackRef::new("Townes Van Zandt", "Pancho and Lefty"),
        ];

        let resolved = resolver.resolve(&tracks, &session).await.unwrap();

        assert!(!resolved[0].is_matched());
        assert!(!resolved[1].is_matched());
        assert!(resolved[2].is_matched());
        assert_eq!(
            service.searches(),
            vec![TrackQuery {
                artist: "Townes Van Zandt".to_string(),
                title: "Pancho and Lefty".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_session_is_rejected_up_front() {
        let service = Arc::new(MockService::new());
        let session = AuthSession::new(AuthorizeParams {
            client_id: "client".to_string(),
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            scopes: Vec::new(),
        });
        let resolver = TrackResolver::new(Arc::clone(&service));

        let err = resolver.resolve(&refs(), &session).await.unwrap_err();

        assert!(matches!(err, PlaylistError::NotAuthenticated));
        assert!(service.searches().is_empty());
    }
}
