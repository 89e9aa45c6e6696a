//! Config types and the registry used to decode envelopes whose type is
//! only known at run time.

use std::any::Any;
use std::fmt;

use datacfg_codec::{CodecResult, EnvelopeCodec};
use datacfg_refs::Persist;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A type that can be stored in a [`ConfigStore`](crate::ConfigStore).
///
/// `TYPE_NAME` is written into every envelope and must be stable across
/// releases. Implement [`Persist`] with the [`persist!`](crate::persist)
/// macro.
pub trait ConfigType: Persist + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TYPE_NAME: &'static str;
}

/// Object-safe view of a loaded [`ConfigType`] value.
pub trait AnyConfig: Send + Sync {
    fn type_name(&self) -> &'static str;
    fn to_value(&self) -> serde_json::Result<Value>;
    fn as_persist_mut(&mut self) -> &mut dyn Persist;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: ConfigType> AnyConfig for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    fn as_persist_mut(&mut self) -> &mut dyn Persist {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Result of [`ConfigStore::load_any`](crate::ConfigStore::load_any).
pub enum LoadedConfig {
    /// Decoded through a registered type, with references restored.
    Typed(Box<dyn AnyConfig>),
    /// The type is not registered; the payload as plain JSON. External
    /// references are not restored.
    Dynamic { type_name: String, value: Value },
}

impl LoadedConfig {
    pub fn type_name(&self) -> &str {
        match self {
            Self::Typed(config) => config.type_name(),
            Self::Dynamic { type_name, .. } => type_name,
        }
    }

    pub fn is_typed(&self) -> bool {
        matches!(self, Self::Typed(_))
    }

    /// Borrow the value as `T`, if it was decoded as `T`.
    pub fn downcast_ref<T: ConfigType>(&self) -> Option<&T> {
        match self {
            Self::Typed(config) => config.as_any().downcast_ref::<T>(),
            Self::Dynamic { .. } => None,
        }
    }

    /// Take the value as `T`, if it was decoded as `T`.
    pub fn downcast<T: ConfigType>(self) -> Option<T> {
        match self {
            Self::Typed(config) => config.into_any().downcast::<T>().ok().map(|b| *b),
            Self::Dynamic { .. } => None,
        }
    }

    /// The payload as JSON. External-resource fields render as `null`.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        match self {
            Self::Typed(config) => config.to_value(),
            Self::Dynamic { value, .. } => Ok(value.clone()),
        }
    }
}

impl fmt::Debug for LoadedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Typed(config) => f.debug_tuple("Typed").field(&config.type_name()).finish(),
            Self::Dynamic { type_name, value } => f
                .debug_struct("Dynamic")
                .field("type_name", type_name)
                .field("value", value)
                .finish(),
        }
    }
}

type DecodeFn = fn(&str) -> CodecResult<Box<dyn AnyConfig>>;

fn decode_as<T: ConfigType>(payload: &str) -> CodecResult<Box<dyn AnyConfig>> {
    let value: T = EnvelopeCodec::decode_payload(payload)?;
    Ok(Box::new(value))
}

/// Type names known to a store, in registration order.
///
/// ```
/// use datacfg_sdk::{persist, ConfigType, TypeRegistry};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Spawn { rate: f32 }
/// persist!(Spawn { plain rate });
/// impl ConfigType for Spawn { const TYPE_NAME: &'static str = "Spawn"; }
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Spawn>();
/// assert!(registry.contains("Spawn"));
/// ```
#[derive(Clone, Default)]
pub struct TypeRegistry {
    entries: Vec<(&'static str, DecodeFn)>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`. Registering a type name twice replaces the decoder and
    /// keeps the original position.
    pub fn register<T: ConfigType>(&mut self) -> &mut Self {
        let decode: DecodeFn = decode_as::<T>;
        match self.entries.iter_mut().find(|(name, _)| *name == T::TYPE_NAME) {
            Some(entry) => entry.1 = decode,
            None => self.entries.push((T::TYPE_NAME, decode)),
        }
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == type_name)
    }

    /// Registered type names in registration order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode `payload` as the type registered under `type_name`.
    ///
    /// Returns `None` if no such type is registered.
    pub fn decode(
        &self,
        type_name: &str,
        payload: &str,
    ) -> Option<CodecResult<Box<dyn AnyConfig>>> {
        self.entries
            .iter()
            .find(|(name, _)| *name == type_name)
            .map(|(_, decode)| decode(payload))
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}
