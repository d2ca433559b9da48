//! Configuration for the replay runner.
//!
//! All configuration is loaded from environment variables. Parsing goes
//! through a lookup function so tests can supply variables without touching
//! the process environment.

use std::path::PathBuf;

use geotrail_player::PlayerConfig;
use geotrail_player::config::DEFAULT_CHANNEL_CAPACITY;

use crate::error::RunnerError;

/// Complete runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayConfig {
    /// JSON-lines file of positions to feed the local player.
    pub positions_path: PathBuf,
    /// File backing device-local storage (the player identity).
    pub storage_path: PathBuf,
    /// File backing the player store (cached tracks and stories).
    pub cache_path: PathBuf,
    /// Buffer size of the in-memory channels the players share.
    pub channel_capacity: usize,
    /// Player tunables derived from the environment.
    pub player: PlayerConfig,
}

impl ReplayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `GEOTRAIL_POSITIONS` -- JSON-lines positions file
    ///
    /// Optional variables:
    /// - `GEOTRAIL_STORAGE_PATH` -- storage file (default `geotrail-storage.json`)
    /// - `GEOTRAIL_CACHE_PATH` -- player store file (default `geotrail-cache.json`)
    /// - `GEOTRAIL_CACHE_ON_CHANGE` -- cache after every position (default `false`)
    /// - `GEOTRAIL_CHANNEL_CAPACITY` -- in-memory channel buffer (default `256`)
    pub fn from_env() -> Result<Self, RunnerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RunnerError> {
        let positions_path = lookup("GEOTRAIL_POSITIONS")
            .map(PathBuf::from)
            .ok_or_else(|| {
                RunnerError::Config("missing required env var GEOTRAIL_POSITIONS".to_owned())
            })?;

        let storage_path = lookup("GEOTRAIL_STORAGE_PATH")
            .map_or_else(|| PathBuf::from("geotrail-storage.json"), PathBuf::from);

        let cache_path = lookup("GEOTRAIL_CACHE_PATH")
            .map_or_else(|| PathBuf::from("geotrail-cache.json"), PathBuf::from);

        let cache_on_change: bool = lookup("GEOTRAIL_CACHE_ON_CHANGE")
            .unwrap_or_else(|| "false".to_owned())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid GEOTRAIL_CACHE_ON_CHANGE: {e}")))?;

        let channel_capacity: usize = lookup("GEOTRAIL_CHANNEL_CAPACITY")
            .unwrap_or_else(|| DEFAULT_CHANNEL_CAPACITY.to_string())
            .parse()
            .map_err(|e| RunnerError::Config(format!("invalid GEOTRAIL_CHANNEL_CAPACITY: {e}")))?;

        Ok(Self {
            positions_path,
            storage_path,
            cache_path,
            channel_capacity,
            player: PlayerConfig {
                cache_on_change,
                ..PlayerConfig::default()
            },
        })
    }
}
