//! Index drift.
//!
//! The index may lag behind the medium: a delete can remove the envelope
//! but fail to update the index, and envelopes can be copied in by hand.

use datacfg_types::ConfigKey;

/// Result of comparing an index against a scan of the medium.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexStatus {
    /// Number of keys in the index.
    pub indexed: usize,
    /// Indexed keys with no envelope on the medium.
    pub stale: Vec<ConfigKey>,
    /// Envelopes on the medium that the index does not list.
    pub untracked: Vec<ConfigKey>,
}

impl IndexStatus {
    /// Returns `true` if the index matches the medium exactly.
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty() && self.untracked.is_empty()
    }

    /// Number of keys that disagree.
    pub fn drift(&self) -> usize {
        self.stale.len() + self.untracked.len()
    }
}
