//! Geolocation sensor handle.
//!
//! A [`PositionSource`] is anything that produces readings: a host sensor
//! bridge, a replay file, or a channel subscription. [`Geolocation`] wraps a
//! source with an on/off switch; players drain it through `poll`.

use std::collections::VecDeque;
use std::io::BufRead;

use geotrail_types::Position;
use tracing::warn;

use crate::error::StorageError;

/// Produces geolocation readings.
pub trait PositionSource {
    /// The next pending reading, or `None` if nothing is waiting right now.
    fn next_position(&mut self) -> Option<Position>;
}

/// A sensor handle owned by a player.
pub struct Geolocation {
    enabled: bool,
    source: Box<dyn PositionSource>,
}

impl Geolocation {
    /// Wrap `source`, starting enabled or disabled.
    pub fn new(source: Box<dyn PositionSource>, enabled: bool) -> Self {
        Self { enabled, source }
    }

    /// Whether readings are currently delivered.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start delivering readings.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stop delivering readings. Pending readings stay in the source.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// The next reading, or `None` when disabled or idle.
    pub fn poll(&mut self) -> Option<Position> {
        if self.enabled {
            self.source.next_position()
        } else {
            None
        }
    }
}

impl core::fmt::Debug for Geolocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Geolocation")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

/// Replays a fixed list of readings in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySource {
    pending: VecDeque<Position>,
}

impl ReplaySource {
    /// Replay `positions` front to back.
    pub fn new(positions: impl IntoIterator<Item = Position>) -> Self {
        Self {
            pending: positions.into_iter().collect(),
        }
    }

    /// Read one JSON position per line. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Serialization`] on the first malformed line,
    /// or [`StorageError::Read`] with the line number if reading fails.
    pub fn from_json_lines(reader: impl BufRead) -> Result<Self, StorageError> {
        let mut pending = VecDeque::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| StorageError::Read {
                line: index.saturating_add(1),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let position: Position = serde_json::from_str(&line).inspect_err(|e| {
                warn!(line = index.saturating_add(1), error = %e, "malformed position");
            })?;
            pending.push_back(position);
        }
        Ok(Self { pending })
    }

    /// Queue another reading.
    pub fn push(&mut self, position: Position) {
        self.pending.push_back(position);
    }

    /// Readings not yet delivered.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl PositionSource for ReplaySource {
    fn next_position(&mut self) -> Option<Position> {
        self.pending.pop_front()
    }
}
