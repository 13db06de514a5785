//! Error types for key-value persistence.

use std::io;
use thiserror::Error;

/// Errors that can occur while reading or writing persisted values.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Key contains characters that cannot be stored in this namespace.
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Storage is disabled or out of space.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// I/O operation on a key failed.
    #[error("I/O error for key {key:?}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(key: &str, source: io::Error) -> Self {
        Self::Io {
            key: key.to_owned(),
            source,
        }
    }
}
