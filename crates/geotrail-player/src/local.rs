//! The player running on this device.
//!
//! A [`LocalPlayer`] resolves its identity from device-local storage,
//! generating and persisting one on first run, and feeds readings from its
//! own geolocation sensor into the core [`Player`]. Given a [`Dspace`], it
//! also publishes every new position on its track channel.

use geotrail_types::{PlayerAttributes, PlayerId};
use tracing::{debug, info, warn};

use crate::channel::{Dspace, track_channel_name};
use crate::error::PlayerError;
use crate::events::{EventKind, PlayerEvent};
use crate::geolocation::{Geolocation, PositionSource};
use crate::player::{Player, PlayerOptions};
use crate::storage::KeyValueStorage;

/// Device collaborators a local player is built from.
pub struct LocalContext<'a> {
    /// Device-local storage holding the identity.
    pub storage: &'a mut dyn KeyValueStorage,
    /// The geolocation sensor.
    pub sensor: Box<dyn PositionSource>,
    /// Channel provider for publishing the track, if networked.
    pub dspace: Option<&'a dyn Dspace>,
}

/// Read the stored identity under `key`, or generate and store a new one.
///
/// # Errors
///
/// Returns [`PlayerError::InvalidIdentity`] if the stored value is not a
/// UUID, or [`PlayerError::Storage`] if the storage fails.
pub fn resolve_identity(
    storage: &mut dyn KeyValueStorage,
    key: &str,
) -> Result<PlayerId, PlayerError> {
    if let Some(value) = storage.get_item(key)? {
        let id = value
            .parse::<PlayerId>()
            .map_err(|source| PlayerError::InvalidIdentity { value, source })?;
        debug!(player = %id, key, "reusing stored identity");
        return Ok(id);
    }

    let id = PlayerId::new();
    storage.set_item(key, &id.to_string())?;
    info!(player = %id, key, "generated and stored new identity");
    Ok(id)
}

/// The player carrying this device.
pub struct LocalPlayer {
    player: Player,
    geolocation: Geolocation,
    track_channel: Option<String>,
}

impl LocalPlayer {
    /// Resolve the device identity and build the player.
    ///
    /// `attrs` and `options` are handed to the core player unchanged; the
    /// identity always comes from storage, so an `attrs.uuid` that disagrees
    /// with it is ignored with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InvalidIdentity`] or [`PlayerError::Storage`]
    /// from identity resolution, and [`PlayerError::Channel`] if the track
    /// channel cannot be opened.
    pub fn new(
        attrs: PlayerAttributes,
        options: PlayerOptions,
        ctx: LocalContext<'_>,
    ) -> Result<Self, PlayerError> {
        let LocalContext {
            storage,
            sensor,
            dspace,
        } = ctx;

        let id = resolve_identity(storage, &options.config.identity_key)?;
        if let Some(given) = attrs.uuid.filter(|given| *given != id) {
            warn!(player = %id, given = %given, "ignoring uuid attribute, device identity wins");
        }

        let geolocation = Geolocation::new(sensor, options.config.geolocation_enabled);
        let track_channel = attrs.channels.track.clone();
        let mut player = Player::initialize(id, attrs, options);

        let track_channel = match dspace {
            Some(dspace) => {
                let name = track_channel.unwrap_or_else(|| track_channel_name(id));
                let channel = dspace.channel(&name)?;
                player.on(EventKind::PositionChanged, move |event: &PlayerEvent| {
                    if let PlayerEvent::PositionChanged(position) = event {
                        if let Err(e) = channel.publish(position) {
                            warn!(
                                channel = channel.name(),
                                error = %e,
                                "failed to publish position"
                            );
                        }
                    }
                });
                info!(player = %id, channel = %name, "publishing track");
                Some(name)
            }
            None => None,
        };

        Ok(Self {
            player,
            geolocation,
            track_channel,
        })
    }

    /// Identity resolved from device storage.
    pub const fn id(&self) -> PlayerId {
        self.player.id()
    }

    /// The core player.
    pub const fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to the core player.
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The sensor handle.
    pub const fn geolocation(&self) -> &Geolocation {
        &self.geolocation
    }

    /// Mutable access to the sensor handle (enable/disable).
    pub fn geolocation_mut(&mut self) -> &mut Geolocation {
        &mut self.geolocation
    }

    /// Name of the channel the track is published on, if networked.
    pub fn track_channel(&self) -> Option<&str> {
        self.track_channel.as_deref()
    }

    /// Deliver every pending sensor reading to the player.
    ///
    /// Returns the number of positions recorded. Nothing is delivered while
    /// geolocation is disabled.
    pub fn sync_geolocation(&mut self) -> usize {
        let mut recorded: usize = 0;
        while let Some(position) = self.geolocation.poll() {
            self.player.new_position(position);
            recorded = recorded.saturating_add(1);
        }
        recorded
    }

    /// Give up the sensor and keep the core player.
    pub fn into_player(self) -> Player {
        self.player
    }
}

impl core::fmt::Debug for LocalPlayer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LocalPlayer")
            .field("player", &self.player)
            .field("geolocation", &self.geolocation)
            .field("track_channel", &self.track_channel)
            .finish()
    }
}
