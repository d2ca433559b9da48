//! Player model, track, story, and geolocation wiring for Geotrail.
//!
//! A player is a person whose positions are recorded over time into a
//! [`Track`] and whose narrative accumulates in a [`Story`]. This crate holds
//! the model and every seam it talks through; it performs no I/O of its own
//! beyond what an injected storage does.
//!
//! # Data Flow
//!
//! ```text
//! sensor --> LocalPlayer::sync_geolocation --> Player::new_position --> Track
//!                                                     |
//!                                                     +--> change:position --> Channel::publish
//!                                                                                   |
//! RemotePlayer::sync_geolocation <-- subscription <---------------------------------+
//! ```
//!
//! # Modules
//!
//! - [`player`] -- The core [`Player`] and its [`PlayerOptions`]
//! - [`local`] -- [`LocalPlayer`]: device identity and sensor wiring
//! - [`remote`] -- [`RemotePlayer`]: a peer followed over a channel
//! - [`track`] -- Append-only [`Track`] of positions
//! - [`story`] -- Narrative [`Story`]
//! - [`events`] -- Typed listeners for `change:position`, `cached`, `loaded`
//! - [`geolocation`] -- Sensor handle and position sources
//! - [`storage`] -- Key-value storage and player stores
//! - [`channel`] -- Named publish/subscribe channels
//! - [`config`] -- Tunable defaults ([`PlayerConfig`])
//! - [`error`] -- Error types ([`PlayerError`])
//!
//! # Usage
//!
//! ```
//! use geotrail_player::{
//!     LocalContext, LocalPlayer, MemoryStorage, PlayerOptions, ReplaySource,
//! };
//! use geotrail_types::{PlayerAttributes, Position};
//!
//! let mut storage = MemoryStorage::new();
//! let sensor = ReplaySource::new([Position::new(47.0, 15.0, 1_381_855_568_774)]);
//! let mut player = LocalPlayer::new(
//!     PlayerAttributes::default(),
//!     PlayerOptions::default(),
//!     LocalContext { storage: &mut storage, sensor: Box::new(sensor), dspace: None },
//! )
//! .ok();
//!
//! if let Some(player) = player.as_mut() {
//!     assert_eq!(player.sync_geolocation(), 1);
//!     assert!(player.player().current_position().is_some());
//! }
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod geolocation;
pub mod local;
pub mod player;
pub mod remote;
pub mod storage;
pub mod story;
pub mod track;

// Re-export primary types at crate root for convenience.
pub use channel::{
    Channel, Dspace, MemoryChannel, MemoryDspace, MemorySubscription, track_channel_name,
};
pub use config::PlayerConfig;
pub use error::{ChannelError, PlayerError, StorageError};
pub use events::{EventKind, ListenerId, Listeners, PlayerEvent, PlayerListener};
pub use geolocation::{Geolocation, PositionSource, ReplaySource};
pub use local::{LocalContext, LocalPlayer, resolve_identity};
pub use player::{Player, PlayerOptions};
pub use remote::RemotePlayer;
pub use storage::{FileStorage, KeyValueStorage, KvPlayerStore, MemoryStorage, PlayerStore};
pub use story::Story;
pub use track::Track;
