use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by Meter Timeline.
#[derive(Error, Debug)]
pub enum TimelineError {
    /// The log file does not exist.
    #[error("The file '{0}' was not found. Please check the file path and try again.")]
    FileNotFound(PathBuf),

    /// A log file exists but could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Batch mode was pointed at something that is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A CSV or plot file could not be written.
    #[error("Failed to write {path}: {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading an answer from, or writing a prompt to, the console failed.
    #[error("Console error: {0}")]
    Console(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TimelineError {
    /// Classify an I/O error raised while opening `path` as a log file.
    pub fn from_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            TimelineError::FileNotFound(path)
        } else {
            TimelineError::FileRead { path, source }
        }
    }

    /// `true` for the missing-file condition, which callers treat as an
    /// absent result rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TimelineError::FileNotFound(_))
    }
}

/// Convenience alias used throughout the timeline crates.
pub type Result<T> = std::result::Result<T, TimelineError>;
