//! Typed publish/subscribe for player notifications.
//!
//! Listeners register for one [`EventKind`] and are invoked synchronously, in
//! registration order, every time the player emits an event of that kind.
//! Listeners only see the event payload, never the player, so they cannot
//! re-enter it while dispatch is in progress.

use geotrail_types::{PlayerId, Position};

/// The kinds of event a player emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A new position was appended to the track (`change:position`).
    PositionChanged,
    /// The player was written to its store (`cached`).
    Cached,
    /// The player was restored from its store (`loaded`).
    Loaded,
}

impl EventKind {
    /// The event name used by the browser client.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PositionChanged => "change:position",
            Self::Cached => "cached",
            Self::Loaded => "loaded",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification emitted by a player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Carries the position just appended to the track.
    PositionChanged(Position),
    /// The player with this identity was cached.
    Cached(PlayerId),
    /// The player with this identity was loaded.
    Loaded(PlayerId),
}

impl PlayerEvent {
    /// Which listeners this event is dispatched to.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::PositionChanged(_) => EventKind::PositionChanged,
            Self::Cached(_) => EventKind::Cached,
            Self::Loaded(_) => EventKind::Loaded,
        }
    }
}

/// Receives player events.
///
/// Implemented for every `FnMut(&PlayerEvent)` closure, so most callers
/// register a closure directly.
pub trait PlayerListener {
    /// Called once per matching event.
    fn on_event(&mut self, event: &PlayerEvent);
}

impl<F> PlayerListener for F
where
    F: FnMut(&PlayerEvent),
{
    fn on_event(&mut self, event: &PlayerEvent) {
        self(event);
    }
}

/// Handle returned by a registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

struct Registration {
    id: ListenerId,
    kind: EventKind,
    listener: Box<dyn PlayerListener>,
}

/// Registry of listeners owned by a single player.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    registrations: Vec<Registration>,
}

impl Listeners {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            next_id: 0,
            registrations: Vec::new(),
        }
    }

    /// Register `listener` for events of `kind`.
    pub fn on(&mut self, kind: EventKind, listener: impl PlayerListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.registrations.push(Registration {
            id,
            kind,
            listener: Box::new(listener),
        });
        id
    }

    /// Unregister a listener. Returns `true` if it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|registration| registration.id != id);
        self.registrations.len() != before
    }

    /// Number of listeners registered for `kind`.
    pub fn count(&self, kind: EventKind) -> usize {
        self.registrations
            .iter()
            .filter(|registration| registration.kind == kind)
            .count()
    }

    /// Dispatch `event` to every listener of its kind.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&mut self, event: &PlayerEvent) -> usize {
        let kind = event.kind();
        let mut delivered: usize = 0;
        for registration in &mut self.registrations {
            if registration.kind == kind {
                registration.listener.on_event(event);
                delivered = delivered.saturating_add(1);
            }
        }
        delivered
    }
}

impl core::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Listeners")
            .field("registered", &self.registrations.len())
            .finish()
    }
}
