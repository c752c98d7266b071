//! Session-specific error types.

use thiserror::Error;

/// Errors raised by session storage operations.
///
/// Only write-side failures are surfaced through this type; read-side
/// failures degrade to an absent session at the [`crate::SessionStore`]
/// level.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The storage backend rejected a read or write.
    #[error("storage error: {0}")]
    Storage(String),

    /// A persisted entry could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
