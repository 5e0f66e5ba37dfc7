use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors outside the note store (terminal, log files, stdio).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Note store errors, possibly relayed across the bridge.
    #[error(transparent)]
    Fs(#[from] FsError),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The backend went away or answered with the wrong reply.
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// Malformed wire data in `serve` mode.
    #[error("Protocol error: {0}")]
    Protocol(#[from] serde_json::Error),
}

/// Named failure kinds of the note store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FsErrorKind {
    NotFound,
    AlreadyExists,
    PermissionDenied,
    InvalidPath,
    NotAFile,
    /// The OS reported a collision that the rename pre-check did not see.
    ConflictUnchecked,
    Other,
}

impl FsErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            FsErrorKind::NotFound => "not found",
            FsErrorKind::AlreadyExists => "already exists",
            FsErrorKind::PermissionDenied => "permission denied",
            FsErrorKind::InvalidPath => "invalid path",
            FsErrorKind::NotAFile => "not a file",
            FsErrorKind::ConflictUnchecked => "unchecked conflict",
            FsErrorKind::Other => "I/O error",
        }
    }
}

impl From<io::ErrorKind> for FsErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => FsErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            io::ErrorKind::AlreadyExists => FsErrorKind::AlreadyExists,
            io::ErrorKind::InvalidInput => FsErrorKind::InvalidPath,
            _ => FsErrorKind::Other,
        }
    }
}

/// A failed note store operation: a kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}: {}", .kind.label(), .message)]
pub struct FsError {
    pub kind: FsErrorKind,
    pub message: String,
}

impl FsError {
    pub fn new(kind: FsErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Wrap an I/O error, naming the path it happened on.
    pub fn io(err: io::Error, path: &Path) -> Self {
        Self::new(err.kind().into(), format!("{}: {}", path.display(), err))
    }

    pub fn not_found(path: &Path) -> Self {
        Self::new(FsErrorKind::NotFound, path.display().to_string())
    }

    pub fn already_exists(path: &Path) -> Self {
        Self::new(FsErrorKind::AlreadyExists, path.display().to_string())
    }

    pub fn invalid_path(reason: impl Into<String>) -> Self {
        Self::new(FsErrorKind::InvalidPath, reason)
    }
}
