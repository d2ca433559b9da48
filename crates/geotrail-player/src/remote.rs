//! A player observed over a channel.
//!
//! A [`RemotePlayer`] has no sensor of its own. Its geolocation handle is a
//! subscription on the peer's track channel, so positions published by the
//! peer's [`crate::LocalPlayer`] arrive here and are recorded the same way.

use geotrail_types::{PlayerAttributes, PlayerId};
use tracing::info;

use crate::channel::Dspace;
use crate::error::PlayerError;
use crate::geolocation::Geolocation;
use crate::player::{Player, PlayerOptions};

/// A peer whose positions arrive over a channel.
pub struct RemotePlayer {
    player: Player,
    geolocation: Geolocation,
    channel: String,
}

impl RemotePlayer {
    /// Build a remote player and subscribe to its track channel.
    ///
    /// The channel is `attrs.channels.track` when set, otherwise the
    /// provider's geolocation channel for `attrs.uuid`.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::MissingIdentity`] if `attrs.uuid` is absent, or
    /// [`PlayerError::Channel`] if the subscription fails.
    pub fn new(
        attrs: PlayerAttributes,
        options: PlayerOptions,
        dspace: &dyn Dspace,
    ) -> Result<Self, PlayerError> {
        let enabled = options.config.geolocation_enabled;
        let named = attrs.channels.track.clone();
        let player = Player::new(attrs, options)?;

        let channel = match named {
            Some(name) => dspace.channel(&name)?,
            None => dspace.geolocation_channel(player.id())?,
        };
        let geolocation = Geolocation::new(channel.subscribe()?, enabled);
        let channel = channel.name().to_owned();
        info!(player = %player.id(), channel = %channel, "following remote track");

        Ok(Self {
            player,
            geolocation,
            channel,
        })
    }

    /// Identity of the peer.
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

    /// The channel-backed geolocation handle.
    pub const fn geolocation(&self) -> &Geolocation {
        &self.geolocation
    }

    /// Mutable access to the geolocation handle (enable/disable).
    pub fn geolocation_mut(&mut self) -> &mut Geolocation {
        &mut self.geolocation
    }

    /// Name of the followed channel.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Record every position received since the last sync.
    ///
    /// Returns the number of positions recorded.
    pub fn sync_geolocation(&mut self) -> usize {
        let mut recorded: usize = 0;
        while let Some(position) = self.geolocation.poll() {
            self.player.new_position(position);
            recorded = recorded.saturating_add(1);
        }
        recorded
    }
}

impl core::fmt::Debug for RemotePlayer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RemotePlayer")
            .field("player", &self.player)
            .field("geolocation", &self.geolocation)
            .field("channel", &self.channel)
            .finish()
    }
}
