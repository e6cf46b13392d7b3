use crate::{config::LoggingConfig, paths::AppDirs};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "plexquery.log";

/// Overrides the computed filter with a full `EnvFilter` directive string.
pub const LOG_ENV_VAR: &str = "PLEXQUERY_LOG";

/// Crates whose events follow the configured level. Everything else,
/// including the HTTP stack, only reports warnings.
const OWN_CRATES: &[&str] = &[
    "plexquery_core",
    "plex_provider",
    "plexquery_library",
    "plexquery",
];

/// Keeps the file writer flushing until dropped.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Installs the global subscriber: console output on stderr (stdout carries
/// query results) plus a daily rolling file in the log directory.
///
/// Each `verbosity` step raises the configured level by one.
pub fn init_logging(
    config: &LoggingConfig,
    dirs: &AppDirs,
    verbosity: u8,
) -> Result<LoggingGuard, LoggingError> {
    let log_dir = dirs.log_dir();
    fs::create_dir_all(log_dir).map_err(|source| LoggingError::CreateDirectory {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let directives = std::env::var(LOG_ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| filter_directives(config, verbosity));
    let env_filter =
        EnvFilter::try_new(&directives).map_err(|source| LoggingError::ParseFilter {
            directives: directives.clone(),
            source,
        })?;

    let (file_writer, file_guard) = open_log_file(config, log_dir)?;
    let writer = if config.stderr {
        BoxMakeWriter::new(std::io::stderr.and(file_writer))
    } else {
        BoxMakeWriter::new(file_writer)
    };

    fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(LoggingError::SubscriberInstall)?;

    tracing::debug!(filter = %directives, log_dir = %log_dir.display(), "logging ready");
    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn filter_directives(config: &LoggingConfig, verbosity: u8) -> String {
    let level = config.level.raised(verbosity).as_filter_directive();
    let mut directives = vec!["warn".to_string()];
    directives.extend(OWN_CRATES.iter().map(|krate| format!("{krate}={level}")));
    directives.join(",")
}

fn open_log_file(
    config: &LoggingConfig,
    log_dir: &Path,
) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let file_stem = config.file_name.as_deref().unwrap_or(DEFAULT_LOG_FILE);
    // Opening the appender touches today's file, making it the newest one.
    let appender = tracing_appender::rolling::daily(log_dir, file_stem);
    prune_logs(log_dir, file_stem, config.max_log_files.max(1))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Deletes all but the `keep` most recently modified `<file_stem>*` files.
fn prune_logs(dir: &Path, file_stem: &str, keep: usize) -> Result<usize, LoggingError> {
    let listing = fs::read_dir(dir).map_err(|source| LoggingError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut logs = Vec::new();
    for entry in listing.flatten() {
        if !entry.file_name().to_string_lossy().starts_with(file_stem) {
            continue;
        }
        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            logs.push((modified, entry.path()));
        }
    }
    logs.sort_by(|a, b| b.0.cmp(&a.0));

    let stale: Vec<PathBuf> = logs.into_iter().skip(keep).map(|(_, path)| path).collect();
    for path in &stale {
        fs::remove_file(path).map_err(|source| LoggingError::Cleanup {
            path: path.clone(),
            source,
        })?;
    }
    Ok(stale.len())
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid log filter {directives:?}: {source}")]
    ParseFilter {
        directives: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    SubscriberInstall(Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to list log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to remove old log file {path}: {source}")]
    Cleanup {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use std::time::{Duration, SystemTime};

    #[test]
    fn directives_quiet_dependencies() {
        let config = LoggingConfig::default();
        assert_eq!(
            filter_directives(&config, 0),
            "warn,plexquery_core=info,plex_provider=info,plexquery_library=info,plexquery=info"
        );
        assert!(filter_directives(&config, 2).contains("plex_provider=trace"));
        assert!(EnvFilter::try_new(filter_directives(&config, 1)).is_ok());
    }

    #[test]
    fn verbosity_saturates_at_trace() {
        assert_eq!(LogLevel::Warn.raised(1), LogLevel::Info);
        assert_eq!(LogLevel::Info.raised(9), LogLevel::Trace);
        assert_eq!(LogLevel::Error.raised(0), LogLevel::Error);
    }

    #[test]
    fn prune_keeps_newest_files() {
        let dir = tempfile::tempdir().unwrap();
        for day in 1..=4u64 {
            let path = dir.path().join(format!("plexquery.log.2026-01-0{day}"));
            fs::write(&path, "x").unwrap();
            fs::File::options()
                .write(true)
                .open(&path)
                .unwrap()
                .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(86_400 * day))
                .unwrap();
        }
        fs::write(dir.path().join("other.txt"), "keep").unwrap();

        assert_eq!(prune_logs(dir.path(), "plexquery.log", 2).unwrap(), 2);

        let mut left: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec![
                "other.txt".to_string(),
                "plexquery.log.2026-01-03".to_string(),
                "plexquery.log.2026-01-04".to_string(),
            ]
        );
    }

    #[test]
    fn single_file_retention_keeps_todays_log() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("plexquery.log.2020-01-01");
        fs::write(&stale, "old").unwrap();
        fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH)
            .unwrap();

        let mut earlier = tracing_appender::rolling::daily(dir.path(), "plexquery.log");
        earlier.write_all(b"earlier run\n").unwrap();
        earlier.flush().unwrap();
        drop(earlier);

        let config = LoggingConfig {
            max_log_files: 1,
            ..LoggingConfig::default()
        };
        let (_writer, guard) = open_log_file(&config, dir.path()).unwrap();
        drop(guard);

        let logs: Vec<PathBuf> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(logs.len(), 1, "{logs:?}");
        assert!(!stale.exists());
        assert!(fs::read_to_string(&logs[0]).unwrap().contains("earlier run"));
    }
}
