use crate::paths::AppDirs;
use crate::translate::PathMapping;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_config_version")]
    pub config_version: u32,
    /// Root of the local music library.
    #[serde(default)]
    pub directory: String,
    #[serde(default)]
    pub plex: PlexConfig,
    #[serde(default)]
    pub plexquery: PlexQueryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            directory: String::new(),
            plex: PlexConfig::default(),
            plexquery: PlexQueryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Connection settings for the Plex server.
#[derive(Clone, Serialize, Deserialize)]
pub struct PlexConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Falls back to the OS keyring when unset.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub secure: bool,
    /// Name of the Plex music library whose playlists are queried.
    #[serde(default)]
    pub library_name: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: None,
            secure: false,
            library_name: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PlexConfig {
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }

    /// Keyring account for this server's token.
    pub fn server_key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl std::fmt::Debug for PlexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlexConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("secure", &self.secure)
            .field("library_name", &self.library_name)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlexQueryConfig {
    /// Library root as the Plex server sees it.
    #[serde(default)]
    pub plex_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
    #[serde(default = "default_stderr_enabled")]
    pub stderr: bool,
    #[serde(default)]
    pub file_name: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_log_files: default_max_log_files(),
            stderr: default_stderr_enabled(),
            file_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Moves `steps` levels towards `Trace`.
    pub fn raised(self, steps: u8) -> Self {
        const ORDER: [LogLevel; 5] = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        let current = ORDER.iter().position(|l| *l == self).unwrap_or(2);
        ORDER[(current + usize::from(steps)).min(ORDER.len() - 1)]
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(ValidationError),
    #[error("failed to prepare configuration directories: {0}")]
    Directories(#[from] crate::paths::DirsError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported config_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("plex.host must not be empty")]
    EmptyHost,
    #[error("plex.port must not be 0")]
    InvalidPort,
    #[error("directory must be an absolute path, got {0:?}")]
    RelativeDirectory(String),
}

impl Config {
    /// Loads the config file named by `dirs`. A missing default file yields
    /// the defaults; a missing explicit file is an error.
    pub fn load(dirs: &AppDirs) -> Result<Self, ConfigError> {
        dirs.ensure_exists()?;
        let path = dirs.config_file();
        if !path.exists() && !dirs.is_config_explicit() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let home = directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        config.directory = expand_home(&config.directory, home.as_deref());
        config.validate().map_err(ConfigError::Validation)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.config_version != CURRENT_CONFIG_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.config_version,
                expected: CURRENT_CONFIG_VERSION,
            });
        }
        if self.plex.host.trim().is_empty() {
            return Err(ValidationError::EmptyHost);
        }
        if self.plex.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        // Local paths must be absolute to ever equal translated Plex paths.
        if !self.directory.is_empty() && !Path::new(&self.directory).is_absolute() {
            return Err(ValidationError::RelativeDirectory(self.directory.clone()));
        }
        Ok(())
    }

    /// `plexquery.plex_dir` rewritten to `directory`.
    pub fn path_mapping(&self) -> PathMapping {
        PathMapping::new(self.plexquery.plex_dir.clone(), self.directory.clone())
    }
}

/// Replaces a leading `~` with `home`.
fn expand_home(path: &str, home: Option<&Path>) -> String {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return path.to_owned(),
    };
    match home {
        Some(home) => format!("{}{rest}", home.display()),
        None => path.to_owned(),
    }
}

fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_host() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    32400
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_max_log_files() -> usize {
    7
}

fn default_stderr_enabled() -> bool {
    true
}
