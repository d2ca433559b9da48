//! Named publish/subscribe channels for sharing positions between players.
//!
//! A [`Dspace`] hands out [`Channel`]s by name. A local player publishes
//! every new position on its track channel; a remote player subscribes to
//! the same channel and treats the subscription as its geolocation source.
//!
//! Track channel names follow `players.{uuid}.track`.
//!
//! [`MemoryDspace`] is the in-process implementation, built on
//! `tokio::sync::broadcast`. Its channels are usable without a runtime:
//! sends and `try_recv` never block.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use geotrail_types::{PlayerId, Position};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use crate::config::DEFAULT_CHANNEL_CAPACITY;
use crate::error::ChannelError;
use crate::geolocation::PositionSource;

/// Name of the channel carrying a player's track.
pub fn track_channel_name(player: PlayerId) -> String {
    format!("players.{player}.track")
}

/// A named position channel.
pub trait Channel {
    /// The channel name.
    fn name(&self) -> &str;

    /// Deliver `position` to every current subscriber.
    ///
    /// Returns the number of subscribers reached; zero is not an error.
    fn publish(&self, position: &Position) -> Result<usize, ChannelError>;

    /// Start receiving positions published from now on.
    fn subscribe(&self) -> Result<Box<dyn PositionSource>, ChannelError>;
}

/// Provider of named channels.
pub trait Dspace {
    /// Open (or create) the channel called `name`.
    fn channel(&self, name: &str) -> Result<Box<dyn Channel>, ChannelError>;

    /// Open the track channel of `player`.
    fn geolocation_channel(&self, player: PlayerId) -> Result<Box<dyn Channel>, ChannelError> {
        self.channel(&track_channel_name(player))
    }
}

/// An open channel and the generation it was opened in.
#[derive(Debug)]
struct Slot {
    generation: u64,
    sender: broadcast::Sender<Position>,
}

#[derive(Debug, Default)]
struct Registry {
    next_generation: u64,
    slots: BTreeMap<String, Slot>,
}

/// In-process channel provider.
///
/// Clones share the same set of channels.
#[derive(Debug, Clone)]
pub struct MemoryDspace {
    capacity: usize,
    registry: Rc<RefCell<Registry>>,
}

impl MemoryDspace {
    /// Create a provider whose channels buffer up to `capacity` positions per
    /// subscriber. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    /// Close the channel called `name`.
    ///
    /// Existing handles fail with [`ChannelError::Closed`] from then on, even
    /// after the name is reopened; subscribers drain what is buffered and
    /// then go quiet. Reopening the name creates a fresh channel. Returns
    /// `true` if the channel was open.
    pub fn close(&self, name: &str) -> bool {
        let closed = self.registry.borrow_mut().slots.remove(name).is_some();
        if closed {
            debug!(channel = name, "channel closed");
        }
        closed
    }

    /// Names of all open channels.
    pub fn channel_names(&self) -> Vec<String> {
        self.registry.borrow().slots.keys().cloned().collect()
    }
}

impl Default for MemoryDspace {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl Dspace for MemoryDspace {
    fn channel(&self, name: &str) -> Result<Box<dyn Channel>, ChannelError> {
        let generation = {
            let mut registry = self.registry.borrow_mut();
            let existing = registry.slots.get(name).map(|slot| slot.generation);
            if let Some(generation) = existing {
                generation
            } else {
                let generation = registry.next_generation;
                registry.next_generation = generation.wrapping_add(1);
                registry.slots.insert(
                    name.to_owned(),
                    Slot {
                        generation,
                        sender: broadcast::channel(self.capacity).0,
                    },
                );
                debug!(channel = name, capacity = self.capacity, generation, "channel opened");
                generation
            }
        };
        Ok(Box::new(MemoryChannel {
            name: name.to_owned(),
            generation,
            registry: Rc::clone(&self.registry),
        }))
    }
}

/// Handle to a channel in a [`MemoryDspace`].
///
/// A handle is bound to one opening of its name; once that channel is
/// closed the handle never reaches a channel reopened under the same name.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    name: String,
    generation: u64,
    registry: Rc<RefCell<Registry>>,
}

impl MemoryChannel {
    fn sender(&self) -> Result<broadcast::Sender<Position>, ChannelError> {
        self.registry
            .borrow()
            .slots
            .get(&self.name)
            .filter(|slot| slot.generation == self.generation)
            .map(|slot| slot.sender.clone())
            .ok_or_else(|| ChannelError::Closed(self.name.clone()))
    }
}

impl Channel for MemoryChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn publish(&self, position: &Position) -> Result<usize, ChannelError> {
        let sender = self.sender()?;
        // send fails only when nobody is subscribed.
        let receivers = sender.send(*position).unwrap_or(0);
        debug!(
            channel = %self.name,
            receivers,
            timestamp = position.timestamp,
            "position published"
        );
        Ok(receivers)
    }

    fn subscribe(&self) -> Result<Box<dyn PositionSource>, ChannelError> {
        let receiver = self.sender()?.subscribe();
        Ok(Box::new(MemorySubscription {
            channel: self.name.clone(),
            receiver,
        }))
    }
}

/// A subscriber's view of a [`MemoryChannel`].
#[derive(Debug)]
pub struct MemorySubscription {
    channel: String,
    receiver: broadcast::Receiver<Position>,
}

impl PositionSource for MemorySubscription {
    fn next_position(&mut self) -> Option<Position> {
        loop {
            match self.receiver.try_recv() {
                Ok(position) => return Some(position),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(
                        channel = %self.channel,
                        skipped,
                        "subscriber lagged, skipping positions"
                    );
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(timestamp: i64) -> Position {
        Position::new(47.0, 15.0, timestamp)
    }

    #[test]
    fn track_channel_name_uses_uuid() {
        let id: PlayerId = "4a4674b2-3b30-44f0-bbdc-fd2efc64237b"
            .parse()
            .unwrap_or_default();
        assert_eq!(
            track_channel_name(id),
            "players.4a4674b2-3b30-44f0-bbdc-fd2efc64237b.track"
        );
    }

    #[test]
    fn publish_without_subscribers_is_ok() {
        let dspace = MemoryDspace::default();
        let channel = dspace.channel("lobby").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(channel.name(), "lobby");
        assert_eq!(channel.publish(&at(1)).ok(), Some(0));
    }

    #[test]
    fn subscribers_see_later_publishes_in_order() {
        let dspace = MemoryDspace::default();
        let publisher = dspace.channel("lobby").unwrap_or_else(|e| panic!("{e}"));
        let _ = publisher.publish(&at(1));

        let mut subscription = dspace
            .channel("lobby")
            .and_then(|channel| channel.subscribe())
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(publisher.publish(&at(2)).ok(), Some(1));
        assert_eq!(publisher.publish(&at(3)).ok(), Some(1));

        assert_eq!(subscription.next_position(), Some(at(2)));
        assert_eq!(subscription.next_position(), Some(at(3)));
        assert_eq!(subscription.next_position(), None);
    }

    #[test]
    fn lagged_subscriber_skips_to_newest() {
        let dspace = MemoryDspace::new(2);
        let channel = dspace.channel("busy").unwrap_or_else(|e| panic!("{e}"));
        let mut subscription = channel.subscribe().unwrap_or_else(|e| panic!("{e}"));
        for timestamp in 1..=5 {
            let _ = channel.publish(&at(timestamp));
        }
        assert_eq!(subscription.next_position(), Some(at(4)));
        assert_eq!(subscription.next_position(), Some(at(5)));
        assert_eq!(subscription.next_position(), None);
    }

    #[test]
    fn closed_channel_rejects_publish() {
        let dspace = MemoryDspace::default();
        let channel = dspace.channel("gone").unwrap_or_else(|e| panic!("{e}"));
        let mut subscription = channel.subscribe().unwrap_or_else(|e| panic!("{e}"));
        let _ = channel.publish(&at(1));

        assert!(dspace.close("gone"));
        assert!(!dspace.close("gone"));
        assert!(matches!(channel.publish(&at(2)), Err(ChannelError::Closed(_))));
        assert!(matches!(channel.subscribe(), Err(ChannelError::Closed(_))));
        assert_eq!(subscription.next_position(), Some(at(1)));
        assert_eq!(subscription.next_position(), None);
        assert!(dspace.channel_names().is_empty());
    }

    #[test]
    fn closed_handle_stays_closed_after_reopen() {
        let dspace = MemoryDspace::default();
        let stale = dspace.channel("c").unwrap_or_else(|e| panic!("{e}"));
        assert!(dspace.close("c"));

        let fresh = dspace.channel("c").unwrap_or_else(|e| panic!("{e}"));
        let mut subscription = fresh.subscribe().unwrap_or_else(|e| panic!("{e}"));

        assert!(matches!(stale.publish(&at(3)), Err(ChannelError::Closed(_))));
        assert!(matches!(stale.subscribe(), Err(ChannelError::Closed(_))));
        assert_eq!(subscription.next_position(), None);

        assert_eq!(fresh.publish(&at(4)).ok(), Some(1));
        assert_eq!(subscription.next_position(), Some(at(4)));
    }

    #[test]
    fn handles_to_the_same_opening_share_a_channel() {
        let dspace = MemoryDspace::default();
        let first = dspace.channel("c").unwrap_or_else(|e| panic!("{e}"));
        let second = dspace.channel("c").unwrap_or_else(|e| panic!("{e}"));
        let mut subscription = second.subscribe().unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(first.publish(&at(1)).ok(), Some(1));
        assert_eq!(subscription.next_position(), Some(at(1)));
    }
}
