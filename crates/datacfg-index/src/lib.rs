//! Key index for datacfg.
//!
//! The index is the set of all known config keys, persisted as a single
//! document next to the envelopes. It lets the store enumerate configs
//! without decoding every envelope, and it can always be rebuilt from a scan
//! of the medium.
//!
//! # Key Types
//!
//! - [`KeyIndex`] -- Ordered, duplicate-free set of keys
//! - [`IndexDocument`] -- Persisted form (`{"configs": [...]}`)
//! - [`IndexStatus`] -- Drift between the index and the medium
//! - [`layout`] -- Where envelopes and the index live on a medium

pub mod error;
pub mod index;
pub mod layout;
pub mod status;

pub use error::{IndexError, IndexResult};
pub use index::{IndexDocument, KeyIndex};
pub use status::IndexStatus;
