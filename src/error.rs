//! Error types shared by the storage tiers.
//!
//! Nothing in this enum ever reaches a caller of the public facade: the
//! facade logs each failure and degrades it to a miss (reads) or a
//! dropped write (sets). Tiers return these errors instead of swallowing
//! them so the boundary stays in one place.

use thiserror::Error;

/// A failure inside one of the storage tiers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("payload transform error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("archive database error: {0}")]
    Database(#[from] heed::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
