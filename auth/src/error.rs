//! Error types for the auth token store.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for auth store operations.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Failures while reading or writing the persisted session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The persistence backend could not be read or written.
    #[error("Auth storage I/O failed at {path}: {source}")]
    Io {
        /// File the backend was using
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The persisted session exists but cannot be decoded.
    #[error("Persisted session at {path} is corrupt: {reason}")]
    CorruptSession {
        /// File the backend was using
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// The session could not be encoded for storage.
    #[error("Failed to encode session: {0}")]
    Encode(String),

    /// Unknown storage backend name (expected `local` or `session`).
    #[error("Unknown auth storage kind: {0}")]
    UnknownStorageKind(String),
}
