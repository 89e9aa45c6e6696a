//! Reference resolution for datacfg.
//!
//! Configs link to external resources (textures, sounds, prefabs) that the
//! store cannot own. Those links are kept out of the payload and recorded in
//! a side-channel [`ReferenceTable`](datacfg_codec::ReferenceTable) keyed by
//! field path. This crate walks config objects to build that table and
//! writes resolved handles back on load.
//!
//! # Architecture
//!
//! - **Descriptors**: every persistable type implements [`Persist`], which
//!   lists its persisted fields in declaration order and hands out typed
//!   accessors. The [`persist!`] macro generates the impl.
//! - **Paths**: [`FieldPath`] is a closed grammar of `name` and `name[i]`
//!   steps joined by `.`.
//! - **Locators**: a [`ResourceLocator`] maps an id (primary) or a location
//!   (fallback) back to a live handle.
//! - **Resolver**: [`ReferenceResolver`] collects and restores. Restore is
//!   best-effort per entry and never aborts the whole object.
//!
//! # Modules
//!
//! - [`error`]: Error types for path and resolution failures
//! - [`path`]: Field path grammar
//! - [`traits`]: [`Persist`], [`FieldRef`], [`FieldMut`], [`ResourceLocator`]
//! - [`macros`]: The [`persist!`] descriptor macro
//! - [`memory`]: In-memory [`InMemoryLocator`]
//! - [`resolver`]: [`ReferenceResolver`] and [`RestoreReport`]

pub mod error;
#[macro_use]
pub mod macros;
pub mod memory;
pub mod path;
pub mod resolver;
pub mod traits;

pub use datacfg_types::{ResourceHandle, ResourceId, ResourceRef};
pub use error::{RefError, Result};
pub use memory::InMemoryLocator;
pub use path::{FieldPath, PathStep};
pub use resolver::{ReferenceResolver, RestoreReport};
pub use traits::{FieldMut, FieldRef, Persist, ResourceLocator};
