//! Player attributes and persisted records.
//!
//! [`PlayerAttributes`] is what a caller hands to a player constructor.
//! [`PlayerRecord`] is the full snapshot written to a player store by
//! `cache()` and read back by `load()`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::ids::PlayerId;
use crate::position::Position;

/// Classification of a player (serialized as the `@type` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum PlayerKind {
    /// A human carrying a device.
    #[default]
    Person,
}

impl PlayerKind {
    /// The attribute value as it appears on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Person => "person",
        }
    }
}

/// Named channels a player publishes to or is followed on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChannelNames {
    /// Channel carrying the player's track positions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<String>,
}

/// Attributes passed to a player at construction.
///
/// Only `uuid` has meaning to the core model; everything else is carried
/// along untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerAttributes {
    /// Identity of the player. Required by `Player::new`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<PlayerId>,
    /// Channel names, used by networked players.
    #[serde(default)]
    pub channels: ChannelNames,
    /// Free-form attributes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl PlayerAttributes {
    /// Attributes carrying only an identity.
    pub fn with_uuid(uuid: PlayerId) -> Self {
        Self {
            uuid: Some(uuid),
            ..Self::default()
        }
    }

    /// Add a free-form attribute, builder style.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Set the track channel name, builder style.
    #[must_use]
    pub fn with_track_channel(mut self, name: impl Into<String>) -> Self {
        self.channels.track = Some(name.into());
        self
    }
}

/// A narrative entry in a player's story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StoryItem {
    /// What happened, in the player's words.
    pub text: String,
    /// Where it happened, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl StoryItem {
    /// Create an entry stamped with the current time.
    pub fn new(text: impl Into<String>, position: Option<Position>) -> Self {
        Self {
            text: text.into(),
            position,
            created_at: Utc::now(),
        }
    }
}

/// Persisted snapshot of a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerRecord {
    /// Identity (primary key).
    pub uuid: PlayerId,
    /// Classification.
    #[serde(rename = "@type")]
    pub kind: PlayerKind,
    /// Channel names.
    #[serde(default)]
    pub channels: ChannelNames,
    /// Free-form attributes.
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub extra: BTreeMap<String, Value>,
    /// Recorded positions in arrival order.
    #[serde(default)]
    pub track: Vec<Position>,
    /// Narrative entries in insertion order.
    #[serde(default)]
    pub story: Vec<StoryItem>,
}
