//! Plex Media Server client for plexquery.
//!
//! Talks to the Plex HTTP API with blocking requests and exposes the audio
//! playlists of one library section through [`RemoteClient`].

mod mapping;
pub mod models;

use mapping::{map_playlist, map_track_refs};
use plexquery_core::models::{PlaylistId, RemotePlaylist, RemoteTrackRef};
use plexquery_core::redact::redact_secrets;
use plexquery_core::remote::{RemoteClient, RemoteError, RemoteResult};
use plexquery_core::PlexConfig;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub use mapping::repair_mojibake;

const TOKEN_HEADER: &str = "X-Plex-Token";

#[derive(Clone)]
pub struct PlexSettings {
    pub base_url: String,
    pub token: Option<String>,
    pub library_name: String,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum PlexSetupError {
    #[error("plex.library_name is not configured")]
    MissingLibraryName,
}

impl PlexSettings {
    /// Builds settings from configuration. `fallback_token` is used when
    /// `plex.token` is unset.
    pub fn from_config(
        config: &PlexConfig,
        fallback_token: Option<String>,
    ) -> Result<Self, PlexSetupError> {
        let library_name = config
            .library_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or(PlexSetupError::MissingLibraryName)?;
        Ok(Self {
            base_url: config.base_url(),
            token: config
                .token
                .clone()
                .filter(|t| !t.is_empty())
                .or(fallback_token)
                .filter(|t| !t.is_empty()),
            library_name,
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }
}

pub struct PlexClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
    library_name: String,
}

impl PlexClient {
    pub fn new(settings: PlexSettings) -> Result<Self, RemoteError> {
        let base_url = Url::parse(&settings.base_url).map_err(|e| RemoteError::Other {
            message: format!("invalid plex url {}: {e}", redact_secrets(&settings.base_url)),
        })?;
        let client = Client::builder()
            .connect_timeout(settings.timeout)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| RemoteError::Other {
                message: e.to_string(),
            })?;
        if settings.token.is_none() {
            tracing::warn!("no plex token configured; requests are unauthenticated");
        }
        Ok(Self {
            client,
            base_url,
            token: settings.token,
            library_name: settings.library_name,
        })
    }

    /// Key of the library section named in the settings.
    pub fn library_section_key(&self) -> RemoteResult<String> {
        let body: models::Envelope<models::SectionContainer> =
            self.get_json("/library/sections", &[], "library sections")?;
        body.media_container
            .directories
            .into_iter()
            .find(|section| section.title == self.library_name)
            .map(|section| section.key)
            .ok_or_else(|| RemoteError::NotFound {
                entity: format!("library '{}'", self.library_name),
            })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        entity: &str,
    ) -> RemoteResult<T> {
        let url = self.base_url.join(path).map_err(|e| RemoteError::Other {
            message: e.to_string(),
        })?;
        let mut request = self
            .client
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.header(TOKEN_HEADER, token);
        }
        tracing::debug!(path, "plex request");

        let resp = request.send().map_err(|e| RemoteError::NetworkError {
            message: redact_secrets(&e.to_string()).into_owned(),
        })?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(RemoteError::AuthenticationError {
                    message: format!("plex rejected the token ({})", resp.status()),
                })
            }
            StatusCode::NOT_FOUND => {
                return Err(RemoteError::NotFound {
                    entity: entity.to_string(),
                })
            }
            status if !status.is_success() => {
                return Err(RemoteError::Other {
                    message: format!("unexpected plex response status {status} for {entity}"),
                })
            }
            _ => {}
        }
        resp.json::<T>().map_err(|e| RemoteError::Other {
            message: format!(
                "invalid plex response for {entity}: {}",
                redact_secrets(&e.to_string())
            ),
        })
    }
}

impl RemoteClient for PlexClient {
    fn list_playlists(&self) -> RemoteResult<Vec<RemotePlaylist>> {
        let section_key = self.library_section_key()?;
        let body: models::Envelope<models::MetadataContainer<models::Playlist>> = self.get_json(
            "/playlists",
            &[
                ("playlistType", "audio"),
                ("sectionID", section_key.as_str()),
                ("sort", "title:asc"),
            ],
            "playlists",
        )?;
        Ok(body
            .media_container
            .metadata
            .iter()
            .filter(|p| p.playlist_type.as_deref().map_or(true, |t| t == "audio"))
            .filter_map(map_playlist)
            .collect())
    }

    fn list_playlist_tracks(&self, playlist_id: &PlaylistId) -> RemoteResult<Vec<RemoteTrackRef>> {
        let body: models::Envelope<models::MetadataContainer<models::Track>> = self.get_json(
            &format!("/playlists/{playlist_id}/items"),
            &[],
            &format!("playlist {playlist_id}"),
        )?;
        Ok(body
            .media_container
            .metadata
            .iter()
            .flat_map(map_track_refs)
            .collect())
    }
}
