use std::path::{Path, PathBuf};

use datacfg_types::KeyScheme;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Settings for opening a filesystem-backed [`ConfigStore`](crate::ConfigStore).
///
/// Loadable from TOML; missing fields take their defaults:
///
/// ```toml
/// root = "assets/data"
/// key_scheme = "composite"
/// pretty = true
/// rebuild_missing_index = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding `configs/` and `index.json`.
    pub root: PathBuf,
    pub key_scheme: KeyScheme,
    /// Write indented JSON.
    pub pretty: bool,
    /// Persist the index produced by a fallback scan when none exists.
    pub rebuild_missing_index: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            key_scheme: KeyScheme::Composite,
            pretty: true,
            rebuild_missing_index: true,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(source: &str) -> SdkResult<Self> {
        toml::from_str(source).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Read a TOML config file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }
}
