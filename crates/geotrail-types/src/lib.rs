//! Shared type definitions for the Geotrail player model.
//!
//! Types defined here are the wire shapes exchanged between the player model,
//! its stores, and its channels. They flow downstream to `TypeScript` via
//! `ts-rs` for the browser client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for player identity
//! - [`position`] -- Geolocation readings
//! - [`player`] -- Player attributes, story items, persisted records

pub mod ids;
pub mod player;
pub mod position;

// Re-export all public types at crate root for convenience.
pub use ids::PlayerId;
pub use player::{ChannelNames, PlayerAttributes, PlayerKind, PlayerRecord, StoryItem};
pub use position::{Coords, Position};
