//! Error types for token storage.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or invalidating a stored token.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O error reading or rewriting the cookie file.
    #[error("IO error on cookie file {path}: {source}")]
    Io {
        /// The cookie file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A cookie line has an invalid format.
    #[error("line {line_number}: {reason}")]
    InvalidLine {
        /// 1-based line number in the cookie file.
        line_number: usize,
        /// Description of what was wrong.
        reason: String,
    },

    /// The in-memory store lock was poisoned by a panicking writer.
    #[error("token store lock poisoned")]
    Poisoned,
}

impl SessionError {
    /// Creates an IO error bound to the cookie file path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid-line error.
    pub fn invalid_line(line_number: usize, reason: impl Into<String>) -> Self {
        Self::InvalidLine {
            line_number,
            reason: reason.into(),
        }
    }
}
