use datacfg_types::ConfigKey;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// The unit of storage: one envelope per config key.
///
/// On disk:
/// ```text
/// { "key": "Weapon_Sword",            // optional, filled from the medium key
///   "typeName": "Weapon",
///   "jsonData": "{\"damage\":12}",     // opaque payload document
///   "name": "Sword",
///   "objectReferencesJson": "{...}" }  // opaque reference table document
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Storage key. Older envelopes omit it; stores fill it from the medium key.
    /// A malformed recorded key is dropped with a warning.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_key"
    )]
    pub key: Option<ConfigKey>,
    /// Name of the concrete type the payload decodes to.
    pub type_name: String,
    /// JSON payload with external-resource fields left out.
    #[serde(rename = "jsonData")]
    pub payload: String,
    /// Human-readable name the key was derived from.
    #[serde(default)]
    pub name: String,
    /// JSON reference table document. Empty means no references.
    #[serde(rename = "objectReferencesJson", default)]
    pub references: String,
}

impl Envelope {
    pub fn new(
        type_name: impl Into<String>,
        name: impl Into<String>,
        payload: impl Into<String>,
        references: impl Into<String>,
    ) -> Self {
        Self {
            key: None,
            type_name: type_name.into(),
            payload: payload.into(),
            name: name.into(),
            references: references.into(),
        }
    }

    /// Assign the storage key.
    pub fn with_key(mut self, key: ConfigKey) -> Self {
        self.key = Some(key);
        self
    }

    /// Returns `true` if the envelope records no external references.
    pub fn has_references(&self) -> bool {
        !self.references.trim().is_empty()
    }
}

fn lenient_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ConfigKey>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match ConfigKey::parse(&raw) {
        Ok(key) => Ok(Some(key)),
        Err(e) => {
            warn!(key = %raw, error = %e, "ignoring malformed recorded key");
            Ok(None)
        }
    }
}
