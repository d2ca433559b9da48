//! Replay runner for the Geotrail player model.
//!
//! Replays a recorded walk (one JSON position per line) through a local
//! player, follows it with a remote player over an in-memory channel, and
//! caches the result. Running it again on the same storage resumes the same
//! player and extends its track.
//!
//! # Architecture
//!
//! ```text
//! walk.jsonl --> LocalPlayer --> MemoryDspace --> RemotePlayer
//!                    |
//!                    +--> identity: GEOTRAIL_STORAGE_PATH
//!                    +--> cache:    GEOTRAIL_CACHE_PATH
//! ```

mod config;
mod error;
mod replay;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ReplayConfig;

/// Application entry point.
///
/// Initializes logging, loads configuration from environment variables,
/// runs one replay, and prints the summary as JSON on stdout.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the replay fails.
fn main() -> anyhow::Result<()> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!("geotrail-replay starting");

    let config = ReplayConfig::from_env().context("loading configuration")?;
    info!(
        positions = %config.positions_path.display(),
        storage = %config.storage_path.display(),
        cache = %config.cache_path.display(),
        cache_on_change = config.player.cache_on_change,
        channel_capacity = config.channel_capacity,
        "configuration loaded"
    );

    let summary = replay::run(&config).context("replay failed")?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
