//! Error types for the geotrail-player crate.
//!
//! All fallible operations return typed errors rather than panicking.
//! [`PlayerError`] is the top-level error; storage and channel failures are
//! wrapped so callers can still match on the underlying cause.

use std::path::PathBuf;

/// Errors raised by a device-local key-value storage or a player store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error on {path}: {source}")]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Reading a line of a line-oriented input failed.
    #[error("read error at line {line}: {source}")]
    Read {
        /// 1-based line number.
        line: usize,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A stored value could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a publish/subscribe channel.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The channel has no way to deliver messages any more.
    #[error("channel {0} is closed")]
    Closed(String),
}

/// Errors that can occur during player operations.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// A player was constructed without a `uuid` attribute.
    #[error("player requires a uuid attribute")]
    MissingIdentity,

    /// A persisted identity is not a valid UUID.
    #[error("invalid player identity {value:?}: {source}")]
    InvalidIdentity {
        /// The offending value.
        value: String,
        /// Why it failed to parse.
        source: uuid::Error,
    },

    /// `cache` or `load` was called on a player built without a store.
    #[error("player {0} has no store")]
    NoStore(String),

    /// The storage layer failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The channel layer failed.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}
