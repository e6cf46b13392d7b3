//! Plex token storage in the OS keyring.
//!
//! Tokens are stored under the service name "plexquery" with one account per
//! server (`plex/<host>:<port>/token`), so the token never has to live in
//! `config.toml`.

use crate::config::PlexConfig;
use thiserror::Error;

/// Service name used for all plexquery credentials in the OS keyring.
const SERVICE_NAME: &str = "plexquery";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("credential not found: {key}")]
    NotFound { key: String },

    #[error("keyring access denied: {0}")]
    AccessDenied(String),

    #[error("keyring unavailable: {0}")]
    Unavailable(String),

    #[error("keyring error: {0}")]
    Other(String),

    #[error("refusing to store an empty token")]
    EmptyToken,
}

impl From<keyring::Error> for SecretsError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => SecretsError::NotFound {
                key: "unknown".into(),
            },
            keyring::Error::NoStorageAccess(e) => SecretsError::AccessDenied(e.to_string()),
            keyring::Error::PlatformFailure(e) => SecretsError::Unavailable(e.to_string()),
            other => SecretsError::Other(other.to_string()),
        }
    }
}

pub type SecretsResult<T> = Result<T, SecretsError>;

/// Where the Plex token for a server was found.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenSource {
    Config(String),
    Keyring(String),
    Missing,
}

impl TokenSource {
    pub fn into_token(self) -> Option<String> {
        match self {
            TokenSource::Config(token) | TokenSource::Keyring(token) => Some(token),
            TokenSource::Missing => None,
        }
    }
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenSource::Config(_) => f.write_str("Config([REDACTED])"),
            TokenSource::Keyring(_) => f.write_str("Keyring([REDACTED])"),
            TokenSource::Missing => f.write_str("Missing"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.into(),
        }
    }

    fn build_key(server: &str) -> String {
        format!("plex/{server}/token")
    }

    fn entry(&self, key: &str) -> SecretsResult<keyring::Entry> {
        Ok(keyring::Entry::new(&self.service, key)?)
    }

    /// Stores the token for `server` (`host:port`).
    pub fn store_token(&self, server: &str, token: &str) -> SecretsResult<()> {
        if token.trim().is_empty() {
            return Err(SecretsError::EmptyToken);
        }
        let key = Self::build_key(server);
        self.entry(&key)?.set_password(token)?;
        tracing::debug!(server, "stored plex token in keyring");
        Ok(())
    }

    /// Returns `SecretsError::NotFound` if no token is stored for `server`.
    pub fn get_token(&self, server: &str) -> SecretsResult<String> {
        let key = Self::build_key(server);
        match self.entry(&key)?.get_password() {
            Ok(token) => Ok(token),
            Err(keyring::Error::NoEntry) => Err(SecretsError::NotFound { key }),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the token; a missing token is not an error.
    pub fn delete_token(&self, server: &str) -> SecretsResult<()> {
        let key = Self::build_key(server);
        match self.entry(&key)?.delete_credential() {
            Ok(()) => {
                tracing::debug!(server, "deleted plex token from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// `plex.token` when set, otherwise the keyring entry for the server.
    ///
    /// Keyring failures other than a missing entry are logged and treated as
    /// no token.
    pub fn token_for(&self, plex: &PlexConfig) -> TokenSource {
        if let Some(token) = plex.token.as_deref().filter(|t| !t.trim().is_empty()) {
            return TokenSource::Config(token.to_string());
        }
        match self.get_token(&plex.server_key()) {
            Ok(token) => TokenSource::Keyring(token),
            Err(SecretsError::NotFound { .. }) => TokenSource::Missing,
            Err(e) => {
                tracing::warn!(error = %e, "could not read plex token from keyring");
                TokenSource::Missing
            }
        }
    }
}
