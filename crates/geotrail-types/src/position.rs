//! Geolocation readings.
//!
//! A [`Position`] mirrors the shape browsers hand out from the geolocation
//! API: a coordinate pair plus a millisecond Unix timestamp. Positions are
//! immutable once recorded and compare by value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Latitude/longitude pair in decimal degrees.
///
/// No range validation is applied; whatever the sensor reports is kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coords {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of Greenwich.
    pub longitude: f64,
}

/// A single timestamped geolocation reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Where the reading was taken.
    pub coords: Coords,
    /// When the reading was taken, in milliseconds since the Unix epoch.
    #[ts(type = "number")]
    pub timestamp: i64,
}

impl Position {
    /// Build a position from raw coordinates and a millisecond timestamp.
    pub const fn new(latitude: f64, longitude: f64, timestamp: i64) -> Self {
        Self {
            coords: Coords {
                latitude,
                longitude,
            },
            timestamp,
        }
    }

    /// The reading time as a UTC date-time.
    ///
    /// Returns `None` when the timestamp falls outside chrono's range.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}
