//! Core error types.

use std::path::PathBuf;

use rusqlite::ffi;
use thiserror::Error;

/// Synchronization engine errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A language, domain, string or translation required by the operation is absent.
    #[error("{0} not found")]
    NotFound(String),

    /// Uniqueness violation, or a write that would re-link an existing row.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed interchange file.
    #[error("parse error in {}: {message}", path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// Any other store failure.
    #[error("storage error: {0}")]
    Store(rusqlite::Error),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parse error for `path`.
    pub fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error maps to an absent row.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, msg)
                if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                    || code.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Error::Conflict(msg.clone().unwrap_or_else(|| code.to_string()))
            }
            _ => Error::Store(err),
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
