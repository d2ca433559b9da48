//! Tunable defaults for player construction.
//!
//! [`PlayerConfig`] bundles every knob that callers (the replay binary,
//! tests) may want to override. The defaults reproduce the browser client:
//! identity stored under `"uuid"`, geolocation switched on, no automatic
//! caching.

/// Storage key holding the device-local player identity.
pub const DEFAULT_IDENTITY_KEY: &str = "uuid";

/// Default buffer size of in-memory broadcast channels, used by
/// `MemoryDspace::default`.
///
/// A subscriber that falls more than this many positions behind skips ahead
/// to the newest ones.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Configuration shared by local and remote players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Key under which a local player persists its identity (default: `"uuid"`).
    pub identity_key: String,

    /// Whether a freshly built geolocation handle starts enabled (default: true).
    pub geolocation_enabled: bool,

    /// Whether every new position triggers `cache()` (default: false).
    pub cache_on_change: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            identity_key: DEFAULT_IDENTITY_KEY.to_owned(),
            geolocation_enabled: true,
            cache_on_change: false,
        }
    }
}
