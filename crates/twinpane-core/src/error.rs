//! Error types for list operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading or reconciling a list.
///
/// None of these are fatal to the process; retry and fallback-path policy
/// belongs to the caller.
#[derive(Debug, Error)]
pub enum ListError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Path exists but is not a directory.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Load was cancelled before completion.
    #[error("Load interrupted")]
    Interrupted,

    /// Invalid selection pattern.
    #[error("Invalid pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    /// Provider does not support the requested operation.
    #[error("Operation not supported by provider: {operation}")]
    Unsupported { operation: String },
}

impl ListError {
    /// Create an I/O error with path context, promoting well-known kinds.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::NotADirectory => Self::NotADirectory { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of non-fatal warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Stat of a single item failed; the item was skipped.
    StatFailed,
    /// The `.hidden` control file could not be read.
    ControlFile,
    /// A directory monitor could not be installed.
    MonitorFailed,
}

/// Non-fatal warning collected during a load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ListWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a stat-failure warning.
    pub fn stat_failed(path: impl Into<PathBuf>, error: &ListError) -> Self {
        let path = path.into();
        Self {
            message: format!("Stat failed: {error}"),
            path,
            kind: WarningKind::StatFailed,
        }
    }
}
