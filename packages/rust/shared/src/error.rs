//! Error types for nbcookbook.
//!
//! Library crates use [`NbcookbookError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all nbcookbook operations.
#[derive(Debug, thiserror::Error)]
pub enum NbcookbookError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed notebook input (invalid JSON, missing structural keys,
    /// or metadata values of the wrong shape). Fatal for the affected
    /// document.
    #[error("notebook error: {message}")]
    Notebook { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A computed artifact path escaped its designated output subtree.
    /// Deletion at such a path is refused.
    #[error("path escapes the output subtree: {path:?}")]
    PathSafety { path: PathBuf },

    /// Data validation error (bad document name, inconsistent build state).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NbcookbookError>;

impl NbcookbookError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a notebook error from any displayable message.
    pub fn notebook(msg: impl Into<String>) -> Self {
        Self::Notebook {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a path-safety error for a rejected deletion path.
    pub fn path_safety(path: impl Into<PathBuf>) -> Self {
        Self::PathSafety { path: path.into() }
    }
}
