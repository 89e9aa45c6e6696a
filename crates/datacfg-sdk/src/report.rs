use datacfg_types::ConfigKey;
use serde::Serialize;

/// Listing entry for one stored config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigSummary {
    pub key: ConfigKey,
    pub type_name: String,
    pub name: String,
    /// Number of recorded external references.
    pub references: usize,
}

/// Outcome of [`ConfigStore::migrate_to_composite`](crate::ConfigStore::migrate_to_composite).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// `(old, new)` key pairs that were moved.
    pub migrated: Vec<(ConfigKey, ConfigKey)>,
    /// Generated keys whose composite key is already taken. Left in place.
    pub collisions: Vec<ConfigKey>,
    /// Generated keys that could not be read, decoded, or named.
    pub skipped: Vec<ConfigKey>,
}

impl MigrationReport {
    pub fn is_complete(&self) -> bool {
        self.collisions.is_empty() && self.skipped.is_empty()
    }
}

/// Outcome of [`ConfigStore::export_to`](crate::ConfigStore::export_to).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub exported: Vec<ConfigKey>,
    /// Indexed keys with no envelope on the source medium.
    pub missing: Vec<ConfigKey>,
}
