pub mod compile;
pub mod config;
pub mod contract;
pub mod extract;
pub mod logging;
pub mod models;
pub mod paths;
pub mod pipeline;
pub mod query;
pub mod redact;
pub mod remote;
pub mod resolve;
pub mod secrets;
pub mod translate;

#[cfg(test)]
mod test_support;

pub use compile::{compile, CompositeFilter};
pub use config::{
    Config, ConfigError, LogLevel, LoggingConfig, PlexConfig, PlexQueryConfig, ValidationError,
};
pub use extract::extract;
pub use logging::{init_logging, LoggingError, LoggingGuard, LOG_ENV_VAR};
pub use models::{PlaylistId, PlaylistRef, RemotePlaylist, RemoteTrackRef};
pub use paths::{AppDirs, DirsError};
pub use pipeline::{PlaylistQuery, PLAYLIST_QUERY_PREFIX};
pub use remote::{RemoteClient, RemoteError, RemoteResult};
pub use resolve::{resolve, PlaylistError};
pub use secrets::{CredentialStore, SecretsError, TokenSource};
pub use translate::{translate, PathMapping};

pub const APP_NAME: &str = "plexquery";
pub const APP_AUTHOR: &str = "plexquery";
pub const APP_QUALIFIER: &str = "io";
