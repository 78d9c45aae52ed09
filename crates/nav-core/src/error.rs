use std::io;
use std::path::Path;

use thiserror::Error;

/// Engine-level failure kinds. Handlers collapse these into a plain error
/// message at the wire boundary; the kinds exist so library callers and
/// tests can tell failures apart.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("directory not empty: {0}")]
    NotEmpty(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("disk statistics unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Classify an OS error against the path it occurred on.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.display().to_string();
        match err.kind() {
            io::ErrorKind::NotFound => EngineError::NotFound(path),
            io::ErrorKind::PermissionDenied => EngineError::PermissionDenied(path),
            io::ErrorKind::AlreadyExists => EngineError::AlreadyExists(path),
            io::ErrorKind::DirectoryNotEmpty => EngineError::NotEmpty(path),
            io::ErrorKind::NotADirectory => EngineError::NotADirectory(path),
            _ => EngineError::Io { path, source: err },
        }
    }
}
