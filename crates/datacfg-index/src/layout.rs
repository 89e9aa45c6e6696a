//! Medium layout.
//!
//! Envelope `K` lives at medium key `configs/K`. The index lives at medium
//! key `index`.

use datacfg_types::ConfigKey;

/// Medium key of the index document.
pub const INDEX_LOCATION: &str = "index";

/// Prefix of every envelope's medium key.
pub const CONFIG_PREFIX: &str = "configs/";

/// Medium key of the envelope stored under `key`.
pub fn config_location(key: &ConfigKey) -> String {
    format!("{CONFIG_PREFIX}{key}")
}

/// Recover the config key from an envelope's medium key.
///
/// Returns `None` for medium keys outside [`CONFIG_PREFIX`] or whose
/// remainder is not a valid config key.
pub fn key_from_location(location: &str) -> Option<ConfigKey> {
    let raw = location.strip_prefix(CONFIG_PREFIX)?;
    ConfigKey::parse(raw).ok()
}
