use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::names::{validate_config_name, validate_type_name};

/// How a store assigns keys to newly created configs.
///
/// A store uses exactly one scheme. Generated keys are opaque and never
/// change; composite keys are derived from `(type, name)` and move on rename.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// A UUID v7 assigned once at creation and never reused.
    Generated,
    /// `{typeName}_{humanName}`, unique per `(type, name)` pair.
    #[default]
    Composite,
}

impl KeyScheme {
    /// Compute the key a new config would receive under this scheme.
    pub fn key_for(&self, type_name: &str, name: &str) -> Result<ConfigKey, TypeError> {
        match self {
            Self::Generated => {
                validate_type_name(type_name)?;
                validate_config_name(name)?;
                Ok(ConfigKey::generate())
            }
            Self::Composite => ConfigKey::composite(type_name, name),
        }
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => write!(f, "generated"),
            Self::Composite => write!(f, "composite"),
        }
    }
}

/// Storage key of a config envelope.
///
/// Keys are always safe to use as a single file-name component: they never
/// contain path separators or `..`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConfigKey(String);

impl ConfigKey {
    /// Generate a fresh opaque key (UUID v7, simple form).
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().simple().to_string())
    }

    /// Build the composite key `{type_name}_{name}`.
    ///
    /// Type names cannot contain `_`, so distinct pairs never share a key.
    pub fn composite(type_name: &str, name: &str) -> Result<Self, TypeError> {
        validate_type_name(type_name)?;
        validate_config_name(name)?;
        Ok(Self(format!("{type_name}_{name}")))
    }

    /// Parse an existing key, checking it is file-name safe.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        validate_config_name(s).map_err(|e| TypeError::InvalidKey {
            key: s.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self(s.to_string()))
    }

    /// Returns `true` if this key has the shape of a generated key.
    pub fn is_generated(&self) -> bool {
        self.0.len() == 32 && uuid::Uuid::try_parse(&self.0).is_ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigKey({})", self.0)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ConfigKey {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ConfigKey> for String {
    fn from(key: ConfigKey) -> Self {
        key.0
    }
}

impl AsRef<str> for ConfigKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn generated_keys_are_unique() {
        let a = ConfigKey::generate();
        let b = ConfigKey::generate();
        assert_ne!(a, b);
        assert!(a.is_generated());
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn composite_key_format() {
        let key = ConfigKey::composite("Weapon", "Sword").unwrap();
        assert_eq!(key.as_str(), "Weapon_Sword");
        assert!(!key.is_generated());
    }

    #[test]
    fn composite_rejects_bad_halves() {
        assert!(ConfigKey::composite("", "Sword").is_err());
        assert!(ConfigKey::composite("Weapon", "").is_err());
        assert!(ConfigKey::composite("Weapon", "a/b").is_err());
    }

    #[test]
    fn composite_keys_split_unambiguously() {
        assert!(ConfigKey::composite("Weapon_A", "B").is_err());
        let key = ConfigKey::composite("Weapon", "A_B").unwrap();
        assert_eq!(key.as_str(), "Weapon_A_B");
        assert_eq!(key.as_str().split_once('_'), Some(("Weapon", "A_B")));
    }

    #[test]
    fn parse_rejects_traversal() {
        assert!(ConfigKey::parse("../etc").is_err());
        assert!(ConfigKey::parse("a/b").is_err());
        assert!(ConfigKey::parse("Weapon_Sword").is_ok());
    }

    #[test]
    fn scheme_key_for() {
        let key = KeyScheme::Composite.key_for("Weapon", "Axe").unwrap();
        assert_eq!(key.as_str(), "Weapon_Axe");

        let key = KeyScheme::Generated.key_for("Weapon", "Axe").unwrap();
        assert!(key.is_generated());

        assert!(KeyScheme::Generated.key_for("Weapon", "").is_err());
    }

    #[test]
    fn scheme_default_and_display() {
        assert_eq!(KeyScheme::default(), KeyScheme::Composite);
        assert_eq!(KeyScheme::Generated.to_string(), "generated");
        assert_eq!(KeyScheme::Composite.to_string(), "composite");
    }

    #[test]
    fn scheme_serde_lowercase() {
        let json = serde_json::to_string(&KeyScheme::Generated).unwrap();
        assert_eq!(json, "\"generated\"");
    }

    #[test]
    fn key_serde_is_plain_string() {
        let key = ConfigKey::composite("Weapon", "Sword").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"Weapon_Sword\"");
        let parsed: ConfigKey = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn key_serde_rejects_invalid() {
        assert!(serde_json::from_str::<ConfigKey>("\"a/b\"").is_err());
    }

    proptest! {
        #[test]
        fn composite_keys_are_parseable(
            ty in "[A-Za-z][A-Za-z0-9]{0,5}(\\.[A-Za-z][A-Za-z0-9]{0,5})?",
            name in "[A-Za-z0-9]([A-Za-z0-9 _-]{0,12}[A-Za-z0-9])?",
        ) {
            let key = ConfigKey::composite(&ty, &name).unwrap();
            let parsed = ConfigKey::parse(key.as_str()).unwrap();
            prop_assert_eq!(key.as_str().split_once('_'), Some((ty.as_str(), name.as_str())));
            prop_assert_eq!(parsed, key);
        }
    }
}
