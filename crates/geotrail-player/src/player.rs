//! The core player model.
//!
//! A [`Player`] owns an identity, a [`Track`] of positions, a [`Story`], an
//! optional [`PlayerStore`], and the listeners subscribed to its events.
//! Local and remote players are built around one of these.

use geotrail_types::{PlayerAttributes, PlayerId, PlayerKind, PlayerRecord, Position, StoryItem};
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::events::{EventKind, ListenerId, Listeners, PlayerEvent, PlayerListener};
use crate::storage::PlayerStore;
use crate::story::Story;
use crate::track::Track;

/// Construction options for a player.
#[derive(Default)]
pub struct PlayerOptions {
    /// Where `cache` writes and `load` reads.
    pub store: Option<Box<dyn PlayerStore>>,
    /// Tunables.
    pub config: PlayerConfig,
}

impl PlayerOptions {
    /// Options carrying a store and default configuration.
    pub fn with_store(store: impl PlayerStore + 'static) -> Self {
        Self {
            store: Some(Box::new(store)),
            config: PlayerConfig::default(),
        }
    }
}

impl core::fmt::Debug for PlayerOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PlayerOptions")
            .field("store", &self.store.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// A person whose movements are recorded.
pub struct Player {
    id: PlayerId,
    kind: PlayerKind,
    attributes: PlayerAttributes,
    store: Option<Box<dyn PlayerStore>>,
    config: PlayerConfig,
    track: Track,
    story: Story,
    listeners: Listeners,
}

impl Player {
    /// Build a player from its attributes.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::MissingIdentity`] if `attrs.uuid` is absent.
    pub fn new(attrs: PlayerAttributes, options: PlayerOptions) -> Result<Self, PlayerError> {
        let id = attrs.uuid.ok_or(PlayerError::MissingIdentity)?;
        Ok(Self::initialize(id, attrs, options))
    }

    /// Build a player whose identity was resolved elsewhere.
    ///
    /// `attrs` and `options` are kept exactly as given.
    pub(crate) fn initialize(
        id: PlayerId,
        attrs: PlayerAttributes,
        options: PlayerOptions,
    ) -> Self {
        let PlayerOptions { store, config } = options;
        debug!(player = %id, has_store = store.is_some(), "player initialized");
        Self {
            id,
            kind: PlayerKind::Person,
            attributes: attrs,
            store,
            config,
            track: Track::new(),
            story: Story::new(),
            listeners: Listeners::new(),
        }
    }

    /// Identity (primary key).
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Classification, always [`PlayerKind::Person`].
    pub const fn kind(&self) -> PlayerKind {
        self.kind
    }

    /// Attributes as passed at construction (or restored by `load`).
    pub const fn attributes(&self) -> &PlayerAttributes {
        &self.attributes
    }

    /// The store given at construction, if any.
    pub fn store(&self) -> Option<&dyn PlayerStore> {
        self.store.as_deref()
    }

    /// Effective configuration.
    pub const fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Recorded positions.
    pub const fn track(&self) -> &Track {
        &self.track
    }

    /// Mutable access to the track.
    ///
    /// Changes made here bypass `change:position`.
    pub fn track_mut(&mut self) -> &mut Track {
        &mut self.track
    }

    /// Narrative entries.
    pub const fn story(&self) -> &Story {
        &self.story
    }

    /// Mutable access to the story.
    pub fn story_mut(&mut self) -> &mut Story {
        &mut self.story
    }

    /// The latest recorded position.
    pub fn current_position(&self) -> Option<&Position> {
        self.track.last()
    }

    /// Record a new reading and notify `change:position` listeners.
    ///
    /// When `cache_on_change` is set the player is also cached; a failed
    /// cache is logged and does not undo the append.
    pub fn new_position(&mut self, position: Position) {
        self.track.add(position);
        debug!(
            player = %self.id,
            latitude = position.coords.latitude,
            longitude = position.coords.longitude,
            timestamp = position.timestamp,
            track_len = self.track.len(),
            "position recorded"
        );
        self.listeners.emit(&PlayerEvent::PositionChanged(position));

        if self.config.cache_on_change {
            if let Err(e) = self.cache() {
                warn!(player = %self.id, error = %e, "cache on change failed");
            }
        }
    }

    /// Append a narrative entry tagged with the current position.
    pub fn tell(&mut self, text: impl Into<String>) {
        let item = StoryItem::new(text, self.current_position().copied());
        self.story.add(item);
    }

    /// Register `listener` for events of `kind`.
    pub fn on(&mut self, kind: EventKind, listener: impl PlayerListener + 'static) -> ListenerId {
        self.listeners.on(kind, listener)
    }

    /// Unregister a listener. Returns `true` if it was registered.
    pub fn off(&mut self, id: ListenerId) -> bool {
        self.listeners.off(id)
    }

    /// Snapshot of everything `cache` persists.
    pub fn to_record(&self) -> PlayerRecord {
        PlayerRecord {
            uuid: self.id,
            kind: self.kind,
            channels: self.attributes.channels.clone(),
            extra: self.attributes.extra.clone(),
            track: self.track.as_slice().to_vec(),
            story: self.story.as_slice().to_vec(),
        }
    }

    /// Write the player to its store and emit `cached`.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::NoStore`] without a store, or
    /// [`PlayerError::Storage`] if the write fails.
    pub fn cache(&mut self) -> Result<(), PlayerError> {
        let record = self.to_record();
        let store = self
            .store
            .as_deref_mut()
            .ok_or_else(|| PlayerError::NoStore(self.id.to_string()))?;
        store.put(&record)?;
        info!(player = %self.id, positions = record.track.len(), "player cached");
        self.listeners.emit(&PlayerEvent::Cached(self.id));
        Ok(())
    }

    /// Restore the player from its store and emit `loaded`.
    ///
    /// Extra attributes, track, and story are replaced without emitting
    /// `change:position`. Channel names stay as constructed, since a local
    /// player has already opened its track channel by then. Returns `false`
    /// (and emits nothing) when the store has no record for this player.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::NoStore`] without a store, or
    /// [`PlayerError::Storage`] if the read fails.
    pub fn load(&mut self) -> Result<bool, PlayerError> {
        let store = self
            .store
            .as_deref()
            .ok_or_else(|| PlayerError::NoStore(self.id.to_string()))?;
        let Some(record) = store.get(self.id)? else {
            debug!(player = %self.id, "no cached record");
            return Ok(false);
        };

        self.attributes.extra = record.extra;
        self.track.replace(record.track);
        self.story.replace(record.story);
        info!(player = %self.id, positions = self.track.len(), "player loaded");
        self.listeners.emit(&PlayerEvent::Loaded(self.id));
        Ok(true)
    }
}

impl core::fmt::Debug for Player {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("track_len", &self.track.len())
            .field("story_len", &self.story.len())
            .field("has_store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use geotrail_types::PlayerRecord;

    use super::*;
    use crate::error::StorageError;
    use crate::storage::{KvPlayerStore, MemoryStorage};

    const UUID: &str = "d05f6115-676e-445c-8242-fa319df4a897";

    fn uuid() -> PlayerId {
        UUID.parse().unwrap_or_default()
    }

    fn first() -> Position {
        Position::new(47.0, 15.0, 1_381_855_568_774)
    }

    fn second() -> Position {
        Position::new(55.0, 22.0, 1_381_855_569_774)
    }

    fn third() -> Position {
        Position::new(52.0, 28.0, 1_381_855_572_774)
    }

    /// Counts `put` calls and keeps the last record written.
    #[derive(Clone, Default)]
    struct RecordingStore {
        puts: Rc<RefCell<Vec<PlayerRecord>>>,
    }

    impl PlayerStore for RecordingStore {
        fn put(&mut self, record: &PlayerRecord) -> Result<(), StorageError> {
            self.puts.borrow_mut().push(record.clone());
            Ok(())
        }

        fn get(&self, _id: PlayerId) -> Result<Option<PlayerRecord>, StorageError> {
            Ok(self.puts.borrow().last().cloned())
        }
    }

    /// Rejects every write.
    struct FailingStore;

    impl PlayerStore for FailingStore {
        fn put(&mut self, _record: &PlayerRecord) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: "cache.json".into(),
                source: std::io::Error::other("disk full"),
            })
        }

        fn get(&self, _id: PlayerId) -> Result<Option<PlayerRecord>, StorageError> {
            Ok(None)
        }
    }

    fn player_with_store() -> Player {
        Player::new(
            PlayerAttributes::with_uuid(uuid()),
            PlayerOptions::with_store(RecordingStore::default()),
        )
        .unwrap_or_else(|e| panic!("player: {e}"))
    }

    fn record_kinds(player: &mut Player, kind: EventKind) -> Rc<RefCell<Vec<PlayerEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        player.on(kind, move |event: &PlayerEvent| {
            sink.borrow_mut().push(event.clone());
        });
        seen
    }

    #[test]
    fn uses_uuid_attribute_as_id() {
        let player = Player::new(PlayerAttributes::with_uuid(uuid()), PlayerOptions::default())
            .unwrap_or_else(|e| panic!("player: {e}"));
        assert_eq!(player.id().to_string(), UUID);
    }

    #[test]
    fn type_is_person() {
        let player = player_with_store();
        assert_eq!(player.kind(), PlayerKind::Person);
        assert_eq!(player.to_record().kind.as_str(), "person");
    }

    #[test]
    fn keeps_store_from_options() {
        assert!(player_with_store().store().is_some());
        let bare = Player::new(PlayerAttributes::with_uuid(uuid()), PlayerOptions::default())
            .unwrap_or_else(|e| panic!("player: {e}"));
        assert!(bare.store().is_none());
    }

    #[test]
    fn missing_uuid_is_an_error() {
        let result = Player::new(PlayerAttributes::default(), PlayerOptions::default());
        assert!(matches!(result, Err(PlayerError::MissingIdentity)));
    }

    #[test]
    fn starts_with_empty_track_and_story() {
        let player = player_with_store();
        assert!(player.track().is_empty());
        assert!(player.story().is_empty());
    }

    #[test]
    fn current_position_is_none_when_track_empty() {
        let player = player_with_store();
        assert_eq!(player.track().len(), 0);
        assert!(player.current_position().is_none());
    }

    #[test]
    fn current_position_is_last_on_track() {
        let mut player = player_with_store();
        player.track_mut().add(first());
        player.track_mut().add(second());
        assert_eq!(player.current_position(), Some(&second()));
    }

    #[test]
    fn new_position_appends_to_track() {
        let mut player = player_with_store();
        player.track_mut().reset();
        player.track_mut().add(first());

        player.new_position(second());
        assert_eq!(player.track().len(), 2);
        player.new_position(third());
        assert_eq!(player.track().len(), 3);
        let order: Vec<Position> = player.track().iter().copied().collect();
        assert_eq!(order, vec![first(), second(), third()]);
    }

    #[test]
    fn new_position_emits_for_first_position() {
        let mut player = player_with_store();
        player.track_mut().reset();
        let seen = record_kinds(&mut player, EventKind::PositionChanged);

        player.new_position(first());
        assert_eq!(*seen.borrow(), vec![PlayerEvent::PositionChanged(first())]);
    }

    #[test]
    fn new_position_emits_for_next_position() {
        let mut player = player_with_store();
        player.track_mut().reset();
        player.track_mut().add(first());
        let seen = record_kinds(&mut player, EventKind::PositionChanged);

        player.new_position(second());
        assert_eq!(*seen.borrow(), vec![PlayerEvent::PositionChanged(second())]);
    }

    #[test]
    fn new_position_does_not_cache_by_default() {
        let store = RecordingStore::default();
        let mut player = Player::new(
            PlayerAttributes::with_uuid(uuid()),
            PlayerOptions::with_store(store.clone()),
        )
        .unwrap_or_else(|e| panic!("player: {e}"));
        player.new_position(first());
        assert!(store.puts.borrow().is_empty());
    }

    #[test]
    fn cache_on_change_puts_every_position() {
        let store = RecordingStore::default();
        let mut options = PlayerOptions::with_store(store.clone());
        options.config.cache_on_change = true;
        let mut player = Player::new(PlayerAttributes::with_uuid(uuid()), options)
            .unwrap_or_else(|e| panic!("player: {e}"));
        let cached = record_kinds(&mut player, EventKind::Cached);

        player.new_position(first());
        player.new_position(second());

        assert_eq!(store.puts.borrow().len(), 2);
        assert_eq!(cached.borrow().len(), 2);
        let last_track = store.puts.borrow().last().map(|r| r.track.clone());
        assert_eq!(last_track, Some(vec![first(), second()]));
    }

    #[test]
    fn failed_cache_on_change_keeps_position() {
        let mut options = PlayerOptions::with_store(FailingStore);
        options.config.cache_on_change = true;
        let mut player = Player::new(PlayerAttributes::with_uuid(uuid()), options)
            .unwrap_or_else(|e| panic!("player: {e}"));
        let moved = record_kinds(&mut player, EventKind::PositionChanged);
        let cached = record_kinds(&mut player, EventKind::Cached);

        player.new_position(first());
        player.new_position(second());

        assert_eq!(player.track().len(), 2);
        assert_eq!(
            *moved.borrow(),
            vec![
                PlayerEvent::PositionChanged(first()),
                PlayerEvent::PositionChanged(second())
            ]
        );
        assert!(cached.borrow().is_empty());
    }

    #[test]
    fn cache_on_change_without_store_keeps_position() {
        let mut options = PlayerOptions::default();
        options.config.cache_on_change = true;
        let mut player = Player::new(PlayerAttributes::with_uuid(uuid()), options)
            .unwrap_or_else(|e| panic!("player: {e}"));
        let moved = record_kinds(&mut player, EventKind::PositionChanged);
        let cached = record_kinds(&mut player, EventKind::Cached);

        player.new_position(first());

        assert_eq!(player.current_position(), Some(&first()));
        assert_eq!(moved.borrow().len(), 1);
        assert!(cached.borrow().is_empty());
    }

    #[test]
    fn cache_triggers_cached_event() {
        let mut player = player_with_store();
        let seen = record_kinds(&mut player, EventKind::Cached);
        assert!(player.cache().is_ok());
        assert_eq!(*seen.borrow(), vec![PlayerEvent::Cached(uuid())]);
    }

    #[test]
    fn cache_without_store_fails() {
        let mut player = Player::new(PlayerAttributes::with_uuid(uuid()), PlayerOptions::default())
            .unwrap_or_else(|e| panic!("player: {e}"));
        assert!(matches!(player.cache(), Err(PlayerError::NoStore(_))));
        assert!(matches!(player.load(), Err(PlayerError::NoStore(_))));
    }

    #[test]
    fn load_triggers_loaded_event_and_restores_silently() {
        let mut writer = Player::new(
            PlayerAttributes::with_uuid(uuid()).with_extra("name", "Jane"),
            PlayerOptions::default(),
        )
        .unwrap_or_else(|e| panic!("player: {e}"));
        writer.new_position(first());
        writer.new_position(second());
        writer.tell("crossed the river");

        let mut store = KvPlayerStore::new(MemoryStorage::new());
        assert!(store.put(&writer.to_record()).is_ok());

        let mut reader =
            Player::new(PlayerAttributes::with_uuid(uuid()), PlayerOptions::with_store(store))
                .unwrap_or_else(|e| panic!("player: {e}"));
        let moved = record_kinds(&mut reader, EventKind::PositionChanged);
        let loaded = record_kinds(&mut reader, EventKind::Loaded);

        assert!(matches!(reader.load(), Ok(true)));
        assert!(moved.borrow().is_empty());
        assert_eq!(*loaded.borrow(), vec![PlayerEvent::Loaded(uuid())]);
        assert_eq!(reader.track().len(), 2);
        assert_eq!(reader.current_position(), Some(&second()));
        assert_eq!(reader.story().len(), 1);
        assert_eq!(
            reader.attributes().extra.get("name"),
            Some(&serde_json::Value::from("Jane"))
        );
    }

    #[test]
    fn load_keeps_constructed_channels() {
        let writer = Player::new(
            PlayerAttributes::with_uuid(uuid()).with_track_channel("team.red"),
            PlayerOptions::default(),
        )
        .unwrap_or_else(|e| panic!("player: {e}"));
        let mut store = KvPlayerStore::new(MemoryStorage::new());
        assert!(store.put(&writer.to_record()).is_ok());

        let mut reader = Player::new(
            PlayerAttributes::with_uuid(uuid()).with_track_channel("team.blue"),
            PlayerOptions::with_store(store),
        )
        .unwrap_or_else(|e| panic!("player: {e}"));
        assert!(matches!(reader.load(), Ok(true)));
        assert_eq!(reader.attributes().channels.track.as_deref(), Some("team.blue"));
    }

    #[test]
    fn load_without_record_returns_false() {
        let mut player = Player::new(
            PlayerAttributes::with_uuid(uuid()),
            PlayerOptions::with_store(KvPlayerStore::new(MemoryStorage::new())),
        )
        .unwrap_or_else(|e| panic!("player: {e}"));
        let loaded = record_kinds(&mut player, EventKind::Loaded);
        assert!(matches!(player.load(), Ok(false)));
        assert!(loaded.borrow().is_empty());
    }

    #[test]
    fn tell_tags_current_position() {
        let mut player = player_with_store();
        player.tell("setting off");
        player.new_position(first());
        player.tell("first stop");
        let tagged: Vec<Option<Position>> = player.story().iter().map(|i| i.position).collect();
        assert_eq!(tagged, vec![None, Some(first())]);
    }

    #[test]
    fn players_do_not_share_tracks() {
        let mut a = player_with_store();
        let b = player_with_store();
        a.new_position(first());
        assert_eq!(a.track().len(), 1);
        assert!(b.track().is_empty());
    }
}
