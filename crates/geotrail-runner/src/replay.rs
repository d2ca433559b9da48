//! One replay run.
//!
//! Feeds a recorded walk through a [`LocalPlayer`] whose identity lives in
//! device storage, follows it with a [`RemotePlayer`] over an in-memory
//! channel, and caches the local player so the next run resumes its track.

use std::fs::File;
use std::io::BufReader;

use geotrail_player::{
    FileStorage, KvPlayerStore, LocalContext, LocalPlayer, MemoryDspace, PlayerOptions,
    RemotePlayer, ReplaySource,
};
use geotrail_types::{PlayerAttributes, PlayerId, Position};
use serde::Serialize;
use tracing::info;

use crate::config::ReplayConfig;
use crate::error::RunnerError;

/// Outcome of a replay run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    /// Device identity of the local player.
    pub player: PlayerId,
    /// Whether a cached track from an earlier run was restored.
    pub resumed: bool,
    /// Positions recorded from the replay file this run.
    pub recorded: usize,
    /// Positions the remote follower received this run.
    pub followed: usize,
    /// Total track length after the run.
    pub track_len: usize,
    /// The local player's latest position.
    pub current_position: Option<Position>,
}

/// Execute a replay run.
///
/// # Errors
///
/// Returns [`RunnerError::Positions`] if the positions file cannot be
/// opened, [`RunnerError::Storage`] if it or a storage file is malformed, and
/// [`RunnerError::Player`] if a player operation fails.
pub fn run(config: &ReplayConfig) -> Result<ReplaySummary, RunnerError> {
    let file = File::open(&config.positions_path).map_err(|source| RunnerError::Positions {
        path: config.positions_path.display().to_string(),
        source,
    })?;
    let sensor = ReplaySource::from_json_lines(BufReader::new(file))?;
    info!(
        path = %config.positions_path.display(),
        positions = sensor.remaining(),
        "replay file loaded"
    );

    let mut device = FileStorage::open(&config.storage_path)?;
    let store = KvPlayerStore::new(FileStorage::open(&config.cache_path)?);
    let dspace = MemoryDspace::new(config.channel_capacity);

    let mut local = LocalPlayer::new(
        PlayerAttributes::default(),
        PlayerOptions {
            store: Some(Box::new(store)),
            config: config.player.clone(),
        },
        LocalContext {
            storage: &mut device,
            sensor: Box::new(sensor),
            dspace: Some(&dspace),
        },
    )?;
    let resumed = local.player_mut().load()?;

    let mut remote = RemotePlayer::new(
        PlayerAttributes::with_uuid(local.id()),
        PlayerOptions {
            store: None,
            config: config.player.clone(),
        },
        &dspace,
    )?;

    let recorded = local.sync_geolocation();
    let followed = remote.sync_geolocation();
    local.player_mut().cache()?;

    let summary = ReplaySummary {
        player: local.id(),
        resumed,
        recorded,
        followed,
        track_len: local.player().track().len(),
        current_position: local.player().current_position().copied(),
    };
    info!(
        player = %summary.player,
        resumed,
        recorded,
        followed,
        track_len = summary.track_len,
        "replay complete"
    );
    Ok(summary)
}
