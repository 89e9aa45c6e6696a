use std::sync::Arc;

use datacfg_codec::{Envelope, EnvelopeCodec, ReferenceTable};
use datacfg_index::layout::config_location;
use datacfg_index::{IndexError, IndexStatus, KeyIndex};
use datacfg_refs::{InMemoryLocator, Persist, ReferenceResolver, ResourceLocator, RestoreReport};
use datacfg_store::{ContentStore, FsContentStore, InMemoryContentStore};
use datacfg_types::{validate_config_name, ConfigKey, KeyScheme};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::{SdkError, SdkResult};
use crate::registry::{ConfigType, LoadedConfig, TypeRegistry};
use crate::report::{ConfigSummary, ExportReport, MigrationReport};

/// Keyed store of config envelopes on a backing medium.
///
/// Saving collects external references, encodes the envelope, writes it, and
/// then records the key in the index. Loading reverses that and resolves
/// references through the store's [`ResourceLocator`].
///
/// Operations are synchronous and assume a single writer.
pub struct ConfigStore {
    medium: Arc<dyn ContentStore>,
    locator: Arc<dyn ResourceLocator>,
    registry: TypeRegistry,
    codec: EnvelopeCodec,
    scheme: KeyScheme,
    rebuild_missing_index: bool,
}

impl ConfigStore {
    /// Create a store over `medium` with composite keys and pretty output.
    pub fn new(medium: Arc<dyn ContentStore>, locator: Arc<dyn ResourceLocator>) -> Self {
        Self {
            medium,
            locator,
            registry: TypeRegistry::new(),
            codec: EnvelopeCodec::default(),
            scheme: KeyScheme::default(),
            rebuild_missing_index: true,
        }
    }

    /// A store with an in-memory medium and an empty in-memory locator.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryLocator::new()),
        )
    }

    /// Open a filesystem-backed store described by `config`.
    pub fn open(config: &StoreConfig, locator: Arc<dyn ResourceLocator>) -> SdkResult<Self> {
        let medium = FsContentStore::open(&config.root)?;
        debug!(root = %config.root.display(), scheme = %config.key_scheme, "opened store");
        let codec = if config.pretty {
            EnvelopeCodec::pretty()
        } else {
            EnvelopeCodec::compact()
        };
        Ok(Self::new(Arc::new(medium), locator)
            .with_scheme(config.key_scheme)
            .with_codec(codec)
            .with_rebuild_missing_index(config.rebuild_missing_index))
    }

    pub fn with_scheme(mut self, scheme: KeyScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_codec(mut self, codec: EnvelopeCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_registry(mut self, registry: TypeRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_rebuild_missing_index(mut self, rebuild: bool) -> Self {
        self.rebuild_missing_index = rebuild;
        self
    }

    /// Register `T` for [`load_any`](Self::load_any).
    pub fn register<T: ConfigType>(&mut self) -> &mut Self {
        self.registry.register::<T>();
        self
    }

    pub fn scheme(&self) -> KeyScheme {
        self.scheme
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn medium(&self) -> &Arc<dyn ContentStore> {
        &self.medium
    }

    pub fn locator(&self) -> &Arc<dyn ResourceLocator> {
        &self.locator
    }

    // ---- Save ----

    /// Store a new config under the key the active scheme derives from
    /// `(T::TYPE_NAME, name)`.
    ///
    /// Fails with [`SdkError::DuplicateKey`] if that key is taken.
    pub fn create<T: ConfigType>(&self, name: &str, object: &T) -> SdkResult<ConfigKey> {
        validate_config_name(name)?;
        let key = self.scheme.key_for(T::TYPE_NAME, name)?;
        if self.medium.exists(&config_location(&key))? {
            return Err(SdkError::DuplicateKey(key));
        }
        self.put(&key, name, object)?;
        info!(%key, type_name = T::TYPE_NAME, "created config");
        Ok(key)
    }

    /// Create or replace the config at `key`. Saving identical content
    /// again leaves the medium untouched.
    ///
    /// `key` must fit the active scheme: under composite keys it must be the
    /// key derived from `(T::TYPE_NAME, name)`, under generated keys it must
    /// be a generated key. Otherwise fails with [`SdkError::SchemeViolation`].
    pub fn save<T: ConfigType>(&self, key: &ConfigKey, name: &str, object: &T) -> SdkResult<()> {
        validate_config_name(name)?;
        self.check_scheme(key, T::TYPE_NAME, name)?;
        self.put(key, name, object)
    }

    fn check_scheme(&self, key: &ConfigKey, type_name: &str, name: &str) -> SdkResult<()> {
        let reason = match self.scheme {
            KeyScheme::Composite => {
                let expected = ConfigKey::composite(type_name, name)?;
                if expected == *key {
                    return Ok(());
                }
                format!("expected {expected}")
            }
            KeyScheme::Generated if key.is_generated() => return Ok(()),
            KeyScheme::Generated => "not a generated key".to_string(),
        };
        Err(SdkError::SchemeViolation {
            key: key.clone(),
            scheme: self.scheme,
            reason,
        })
    }

    fn put<T: ConfigType>(&self, key: &ConfigKey, name: &str, object: &T) -> SdkResult<()> {
        let table = ReferenceResolver::collect(object);
        let payload = EnvelopeCodec::encode_payload(object)?;
        let references = if table.is_empty() {
            String::new()
        } else {
            EnvelopeCodec::encode_references(&table)?
        };
        let envelope =
            Envelope::new(T::TYPE_NAME, name, payload, references).with_key(key.clone());
        self.write_envelope(key, &envelope)?;
        self.update_index(|index| index.insert(key.clone()))
    }

    fn write_envelope(&self, key: &ConfigKey, envelope: &Envelope) -> SdkResult<()> {
        let data = self.codec.encode(envelope)?;
        let location = config_location(key);
        if self.medium.read(&location)?.as_deref() == Some(data.as_slice()) {
            debug!(%key, "envelope unchanged");
            return Ok(());
        }
        self.medium.write(&location, &data)?;
        debug!(%key, bytes = data.len(), "wrote envelope");
        Ok(())
    }

    // ---- Load ----

    /// Load the config at `key` as `T`.
    ///
    /// A missing or undecodable envelope is logged and yields `Ok(None)`.
    /// References that cannot be resolved are left empty. Only medium
    /// failures are errors.
    pub fn load<T: ConfigType>(&self, key: &ConfigKey) -> SdkResult<Option<T>> {
        Ok(self.load_with_report(key)?.map(|(object, _)| object))
    }

    /// Like [`load`](Self::load), also returning per-reference outcomes.
    pub fn load_with_report<T: ConfigType>(
        &self,
        key: &ConfigKey,
    ) -> SdkResult<Option<(T, RestoreReport)>> {
        let Some(envelope) = self.inspect(key)? else {
            return Ok(None);
        };
        if envelope.type_name != T::TYPE_NAME {
            warn!(
                %key,
                stored = %envelope.type_name,
                requested = T::TYPE_NAME,
                "type name mismatch; decoding anyway"
            );
        }
        let mut object: T = match EnvelopeCodec::decode_payload(&envelope.payload) {
            Ok(object) => object,
            Err(e) => {
                warn!(%key, error = %e, "failed to decode payload");
                return Ok(None);
            }
        };
        let report = self.restore(key, &envelope, &mut object);
        Ok(Some((object, report)))
    }

    /// Load the config at `key` without knowing its type in advance.
    ///
    /// Registered types decode to [`LoadedConfig::Typed`]; anything else
    /// degrades to [`LoadedConfig::Dynamic`] with a warning.
    pub fn load_any(&self, key: &ConfigKey) -> SdkResult<Option<LoadedConfig>> {
        let Some(envelope) = self.inspect(key)? else {
            return Ok(None);
        };
        match self.registry.decode(&envelope.type_name, &envelope.payload) {
            Some(Ok(mut config)) => {
                self.restore(key, &envelope, config.as_persist_mut());
                Ok(Some(LoadedConfig::Typed(config)))
            }
            Some(Err(e)) => {
                warn!(
                    %key,
                    type_name = %envelope.type_name,
                    error = %e,
                    "failed to decode payload"
                );
                Ok(None)
            }
            None => {
                warn!(
                    %key,
                    type_name = %envelope.type_name,
                    "type not registered; loading as plain JSON"
                );
                match EnvelopeCodec::decode_payload_dynamic(&envelope.payload) {
                    Ok(value) => Ok(Some(LoadedConfig::Dynamic {
                        type_name: envelope.type_name,
                        value,
                    })),
                    Err(e) => {
                        warn!(%key, error = %e, "failed to decode payload");
                        Ok(None)
                    }
                }
            }
        }
    }

    /// Read and decode the raw envelope at `key`, without touching the
    /// payload. Missing and undecodable envelopes are logged and yield
    /// `Ok(None)`.
    pub fn inspect(&self, key: &ConfigKey) -> SdkResult<Option<Envelope>> {
        let Some(data) = self.medium.read(&config_location(key))? else {
            warn!(%key, "config not found");
            return Ok(None);
        };
        let mut envelope = match EnvelopeCodec::decode(&data) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(%key, error = %e, "skipping undecodable envelope");
                return Ok(None);
            }
        };
        if envelope.key.as_ref() != Some(key) {
            if let Some(recorded) = &envelope.key {
                warn!(%key, %recorded, "envelope records a different key; using the medium key");
            }
            envelope.key = Some(key.clone());
        }
        Ok(Some(envelope))
    }

    fn restore(
        &self,
        key: &ConfigKey,
        envelope: &Envelope,
        object: &mut dyn Persist,
    ) -> RestoreReport {
        let table = match EnvelopeCodec::decode_references(&envelope.references) {
            Ok(table) => table,
            Err(e) => {
                warn!(%key, error = %e, "ignoring corrupt reference table");
                ReferenceTable::new()
            }
        };
        let report = ReferenceResolver::restore(object, &table, &*self.locator);
        if !report.is_complete() {
            warn!(
                %key,
                unresolved = report.unresolved,
                invalid = report.invalid,
                "some references were not restored"
            );
        }
        report
    }

    // ---- Query ----

    /// Whether an envelope exists at `key`. Never decodes.
    pub fn exists(&self, key: &ConfigKey) -> SdkResult<bool> {
        Ok(self.medium.exists(&config_location(key))?)
    }

    /// Every indexed key. May include keys whose envelope has gone missing.
    pub fn keys(&self) -> SdkResult<Vec<ConfigKey>> {
        Ok(self.current_index()?.keys().to_vec())
    }

    /// Keys of every stored config whose type name is `type_name`.
    ///
    /// Indexed keys with a missing or undecodable envelope are skipped with a
    /// warning. Without an index the medium is scanned instead.
    pub fn keys_of_type(&self, type_name: &str) -> SdkResult<Vec<ConfigKey>> {
        let index = self.current_index()?;
        let mut keys = Vec::new();
        for key in &index {
            let Some(data) = self.medium.read(&config_location(key))? else {
                warn!(%key, "indexed config is missing; skipping");
                continue;
            };
            match EnvelopeCodec::peek_type_name(&data) {
                Ok(stored) if stored == type_name => keys.push(key.clone()),
                Ok(_) => {}
                Err(e) => warn!(%key, error = %e, "skipping undecodable envelope"),
            }
        }
        debug!(type_name, count = keys.len(), "enumerated configs");
        Ok(keys)
    }

    /// A summary of every readable indexed config.
    pub fn entries(&self) -> SdkResult<Vec<ConfigSummary>> {
        let index = self.current_index()?;
        let mut entries = Vec::with_capacity(index.len());
        for key in &index {
            let Some(envelope) = self.inspect(key)? else {
                continue;
            };
            let references = EnvelopeCodec::decode_references(&envelope.references)
                .map(|table| table.len())
                .unwrap_or_default();
            entries.push(ConfigSummary {
                key: key.clone(),
                type_name: envelope.type_name,
                name: envelope.name,
                references,
            });
        }
        Ok(entries)
    }

    // ---- Mutation ----

    /// Remove the envelope and its index entry.
    ///
    /// Both halves are attempted even if the first fails. Returns whether an
    /// envelope existed.
    pub fn delete(&self, key: &ConfigKey) -> SdkResult<bool> {
        let removed = self.medium.delete(&config_location(key));
        if let Err(e) = &removed {
            warn!(%key, error = %e, "failed to remove envelope");
        }
        if let Err(e) = self.update_index(|index| index.remove(key)) {
            warn!(%key, error = %e, "failed to remove index entry");
        }
        let removed = removed?;
        if removed {
            info!(%key, "deleted config");
        } else {
            debug!(%key, "nothing to delete");
        }
        Ok(removed)
    }

    /// Give the config at `key` a new human name and return its key.
    ///
    /// Under the composite scheme the key moves: the new envelope is written
    /// before the old one is removed, so a failed write leaves the old key
    /// intact. Under the generated scheme the key is stable.
    pub fn rename(&self, key: &ConfigKey, new_name: &str) -> SdkResult<ConfigKey> {
        validate_config_name(new_name)?;
        let data = self
            .medium
            .read(&config_location(key))?
            .ok_or_else(|| SdkError::NotFound(key.clone()))?;
        let mut envelope = EnvelopeCodec::decode(&data)?;
        let new_key = match self.scheme {
            KeyScheme::Composite => ConfigKey::composite(&envelope.type_name, new_name)?,
            KeyScheme::Generated => key.clone(),
        };
        envelope.name = new_name.to_string();
        envelope.key = Some(new_key.clone());

        if new_key == *key {
            self.write_envelope(key, &envelope)?;
            self.update_index(|index| index.insert(key.clone()))?;
            info!(%key, new_name, "renamed config in place");
            return Ok(new_key);
        }

        let destination = config_location(&new_key);
        if self.medium.exists(&destination)? {
            return Err(SdkError::DuplicateKey(new_key));
        }
        self.medium.write(&destination, &self.codec.encode(&envelope)?)?;
        if let Err(e) = self.medium.delete(&config_location(key)) {
            warn!(old = %key, error = %e, "failed to remove the old envelope after rename");
        }
        self.update_index(|index| {
            let removed = index.remove(key);
            let inserted = index.insert(new_key.clone());
            removed || inserted
        })?;
        info!(old = %key, new = %new_key, "renamed config");
        Ok(new_key)
    }

    // ---- Maintenance ----

    /// Rewrite the index from a full scan of the medium.
    ///
    /// Returns the drift the old index had.
    pub fn rebuild_index(&self) -> SdkResult<IndexStatus> {
        let previous = self.load_index()?.unwrap_or_default();
        let status = previous.status(&*self.medium)?;
        let scanned = KeyIndex::scan(&*self.medium)?;
        scanned.persist(&*self.medium, self.codec.is_pretty())?;
        info!(
            keys = scanned.len(),
            stale = status.stale.len(),
            untracked = status.untracked.len(),
            "rebuilt index"
        );
        Ok(status)
    }

    /// Move every config stored under a generated key to its composite key.
    ///
    /// Entries whose composite key is taken are left in place and reported.
    pub fn migrate_to_composite(&self) -> SdkResult<MigrationReport> {
        let mut index = self.current_index()?;
        let generated: Vec<ConfigKey> =
            index.iter().filter(|k| k.is_generated()).cloned().collect();
        let mut report = MigrationReport::default();

        for old in generated {
            let Some(mut envelope) = self.inspect(&old)? else {
                report.skipped.push(old);
                continue;
            };
            let new = match ConfigKey::composite(&envelope.type_name, &envelope.name) {
                Ok(new) => new,
                Err(e) => {
                    warn!(
                        key = %old,
                        error = %e,
                        "cannot derive a composite key; leaving in place"
                    );
                    report.skipped.push(old);
                    continue;
                }
            };
            if self.medium.exists(&config_location(&new))? {
                warn!(
                    key = %old,
                    composite = %new,
                    "composite key already taken; leaving in place"
                );
                report.collisions.push(old);
                continue;
            }

            envelope.key = Some(new.clone());
            self.medium.write(&config_location(&new), &self.codec.encode(&envelope)?)?;
            if let Err(e) = self.medium.delete(&config_location(&old)) {
                warn!(key = %old, error = %e, "failed to remove the generated-key envelope");
            }
            index.remove(&old);
            index.insert(new.clone());
            index.persist(&*self.medium, self.codec.is_pretty())?;
            debug!(old = %old, new = %new, "migrated config");
            report.migrated.push((old, new));
        }

        info!(
            migrated = report.migrated.len(),
            collisions = report.collisions.len(),
            skipped = report.skipped.len(),
            "migrated to composite keys"
        );
        Ok(report)
    }

    /// Copy every indexed envelope, and an index of what was copied, into
    /// `target`. Envelope bytes are copied verbatim.
    pub fn export_to(&self, target: &dyn ContentStore) -> SdkResult<ExportReport> {
        let index = self.current_index()?;
        let mut copied = KeyIndex::new();
        let mut report = ExportReport::default();

        for key in &index {
            let location = config_location(key);
            match self.medium.read(&location)? {
                Some(data) => {
                    target.write(&location, &data)?;
                    copied.insert(key.clone());
                    report.exported.push(key.clone());
                }
                None => {
                    warn!(%key, "indexed config is missing; not exported");
                    report.missing.push(key.clone());
                }
            }
        }
        copied.persist(target, self.codec.is_pretty())?;
        info!(exported = report.exported.len(), missing = report.missing.len(), "exported configs");
        Ok(report)
    }

    // ---- Index ----

    /// The persisted index. A corrupt index document counts as missing.
    fn load_index(&self) -> SdkResult<Option<KeyIndex>> {
        match KeyIndex::load(&*self.medium) {
            Ok(index) => Ok(index),
            Err(IndexError::Serialization(e)) => {
                warn!(error = %e, "index is corrupt; falling back to a scan");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The persisted index, or a fresh scan when there is none.
    fn current_index(&self) -> SdkResult<KeyIndex> {
        if let Some(index) = self.load_index()? {
            return Ok(index);
        }
        let index = KeyIndex::scan(&*self.medium)?;
        if self.rebuild_missing_index {
            index.persist(&*self.medium, self.codec.is_pretty())?;
            info!(keys = index.len(), "rebuilt missing index");
        } else {
            debug!(keys = index.len(), "index missing; using scan");
        }
        Ok(index)
    }

    /// Apply `edit` to the index and persist it if anything changed. A
    /// missing index is rebuilt by scan first.
    fn update_index(&self, edit: impl FnOnce(&mut KeyIndex) -> bool) -> SdkResult<()> {
        let (mut index, loaded) = match self.load_index()? {
            Some(index) => (index, true),
            None => (KeyIndex::scan(&*self.medium)?, false),
        };
        if edit(&mut index) || !loaded {
            index.persist(&*self.medium, self.codec.is_pretty())?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("scheme", &self.scheme)
            .field("registry", &self.registry)
            .field("pretty", &self.codec.is_pretty())
            .finish()
    }
}
