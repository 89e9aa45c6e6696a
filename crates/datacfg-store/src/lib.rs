//! Backing media for datacfg.
//!
//! A medium is a flat key-value store of byte documents. Keys are
//! `/`-separated relative paths such as `configs/Weapon_Sword` or `index`.
//! The medium never interprets document contents.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsContentStore`] -- one `.json` file per key under a root directory
//!
//! # Design Rules
//!
//! 1. Writes replace the whole document. Readers never see a partial write.
//! 2. Reading or deleting a missing key is not an error.
//! 3. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsContentStore;
pub use key::validate_medium_key;
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
