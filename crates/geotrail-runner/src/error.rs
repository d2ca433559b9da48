//! Error types for the replay runner.

use geotrail_player::{PlayerError, StorageError};

/// Errors that can occur during a replay run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// The positions file could not be opened.
    #[error("cannot open positions file {path}: {source}")]
    Positions {
        /// The file that failed to open.
        path: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Storage failed outside of a player operation.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A player operation failed.
    #[error(transparent)]
    Player(#[from] PlayerError),
}
