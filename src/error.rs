/// Error types.
///
/// Only setup can fail in a recoverable way: reading configuration, parsing
/// colors, opening the log file. The game loop itself never errors (see
/// `sim::board`); terminal I/O failures surface as `io::Error`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("color `{0}` is not in #rrggbb form")]
    Malformed(String),
    #[error("color `{input}` has a non-hex channel")]
    BadChannel { input: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("board sides must be between {min} and {max}, got {width}x{height}")]
    BoardSize { width: usize, height: usize, min: usize, max: usize },
    #[error("tick interval must be at least 1 ms")]
    TickInterval,
    #[error("unknown shape `{0}` in [colors]")]
    UnknownShape(String),
    #[error("bad color for shape {shape}: {source}")]
    Color {
        shape: String,
        #[source]
        source: ColorError,
    },
}

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("could not open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid log filter `{0}`")]
    Filter(String),
    #[error("could not install log subscriber: {0}")]
    Install(String),
}
