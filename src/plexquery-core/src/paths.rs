use crate::{APP_AUTHOR, APP_NAME, APP_QUALIFIER};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Where plexquery reads its config and writes its logs.
#[derive(Debug, Clone)]
pub struct AppDirs {
    config_file: PathBuf,
    /// Set when the config file was named on the command line.
    explicit_config: bool,
    log_dir: PathBuf,
}

impl AppDirs {
    pub fn discover() -> Result<Self, DirsError> {
        let dirs = ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME)
            .ok_or(DirsError::MissingProjectDirs)?;
        Ok(Self::from_parts(dirs.config_dir(), dirs.data_dir()))
    }

    pub fn from_parts(config_dir: &Path, data_dir: &Path) -> Self {
        Self {
            config_file: config_dir.join(CONFIG_FILE_NAME),
            explicit_config: false,
            log_dir: data_dir.join("logs"),
        }
    }

    /// Reads config from `path` instead; a missing file is then an error.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self.explicit_config = true;
        self
    }

    /// Creates the config and log directories.
    pub fn ensure_exists(&self) -> Result<(), DirsError> {
        let config_dir = self.config_file.parent().filter(|p| !p.as_os_str().is_empty());
        for dir in config_dir.into_iter().chain([self.log_dir.as_path()]) {
            std::fs::create_dir_all(dir).map_err(|source| DirsError::CreateDirectory {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn is_config_explicit(&self) -> bool {
        self.explicit_config
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

#[derive(Debug, Error)]
pub enum DirsError {
    #[error("unable to determine project directories for plexquery")]
    MissingProjectDirs,
    #[error("failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
}
