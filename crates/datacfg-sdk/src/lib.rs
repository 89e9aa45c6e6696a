//! Config store for datacfg.
//!
//! [`ConfigStore`] is the main entry point for applications: it maps keys to
//! envelopes on a backing medium, keeps the key index current, and resolves
//! external-resource links on load.
//!
//! ```
//! use datacfg_sdk::{persist, ConfigStore, ConfigType, ResourceRef};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Weapon { damage: u32, icon: ResourceRef }
//! persist!(Weapon { plain damage, resource icon });
//! impl ConfigType for Weapon { const TYPE_NAME: &'static str = "Weapon"; }
//!
//! let store = ConfigStore::in_memory();
//! let key = store.create("Sword", &Weapon { damage: 12, ..Default::default() }).unwrap();
//! assert_eq!(key.as_str(), "Weapon_Sword");
//! let sword: Weapon = store.load(&key).unwrap().unwrap();
//! assert_eq!(sword.damage, 12);
//! ```

pub mod config;
pub mod error;
pub mod registry;
pub mod report;
pub mod store;

pub use config::StoreConfig;
pub use error::{SdkError, SdkResult};
pub use registry::{AnyConfig, ConfigType, LoadedConfig, TypeRegistry};
pub use report::{ConfigSummary, ExportReport, MigrationReport};
pub use store::ConfigStore;

// Re-export key types
pub use datacfg_codec::{Envelope, EnvelopeCodec, ReferenceEntry, ReferenceTable};
pub use datacfg_index::IndexStatus;
pub use datacfg_refs::{
    persist, InMemoryLocator, Persist, ResourceHandle, ResourceId, ResourceLocator, ResourceRef,
    RestoreReport,
};
pub use datacfg_store::{ContentStore, FsContentStore, InMemoryContentStore};
pub use datacfg_types::{ConfigKey, KeyScheme};
