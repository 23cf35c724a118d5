/// Log setup.
///
/// The terminal belongs to the renderer while the game runs, so log lines
/// go to a file instead of stderr. `RUST_LOG` overrides the configured
/// level when set.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::LogInitError;

/// Install the global subscriber. Returns `Ok(false)` when logging is
/// disabled by an empty `file`.
pub fn init(cfg: &LoggingConfig) -> Result<bool, LogInitError> {
    if cfg.file.as_os_str().is_empty() {
        return Ok(false);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .map_err(|_| LogInitError::Filter(cfg.level.clone()))?,
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cfg.file)
        .map_err(|source| LogInitError::Open {
            path: cfg.file.clone(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| LogInitError::Install(e.to_string()))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn empty_path_disables_logging() {
        let cfg = LoggingConfig { file: PathBuf::new(), level: "info".into() };
        assert!(!init(&cfg).unwrap());
    }

    #[test]
    fn bad_level_is_reported() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let cfg = LoggingConfig {
            file: std::env::temp_dir().join("blockfall-test.log"),
            level: "blockfall=loud".into(),
        };
        assert!(matches!(init(&cfg), Err(LogInitError::Filter(_))));
    }
}
