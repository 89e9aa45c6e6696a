//! Foundation types for datacfg.
//!
//! This crate provides the identity and naming types shared by every other
//! datacfg crate: how configs are keyed, how names are validated, and how
//! links to external resources are represented.
//!
//! # Key Types
//!
//! - [`ConfigKey`]: Opaque storage key of a config envelope
//! - [`KeyScheme`]: Generated (UUID v7) or composite (`{type}_{name}`) keys
//! - [`ResourceHandle`]: Handle to an external resource the store does not own
//! - [`ResourceRef`]: Config field slot holding an optional [`ResourceHandle`]
//! - [`ResourceId`]: Primary lookup identity of an external resource

pub mod error;
pub mod key;
pub mod names;
pub mod resource;

pub use error::TypeError;
pub use key::{ConfigKey, KeyScheme};
pub use names::{validate_config_name, validate_type_name};
pub use resource::{ResourceHandle, ResourceId, ResourceRef};
