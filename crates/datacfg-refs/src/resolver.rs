use datacfg_codec::{ReferenceEntry, ReferenceTable};
use datacfg_types::{ResourceHandle, ResourceId, ResourceRef};
use tracing::{debug, warn};

use crate::error::{RefError, Result};
use crate::path::{FieldPath, PathStep};
use crate::traits::{FieldMut, FieldRef, Persist, ResourceLocator};

/// Per-entry outcome counts of a [`ReferenceResolver::restore`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Entries whose field now holds a resolved handle.
    pub restored: usize,
    /// Entries whose path was valid but whose resource could not be found.
    /// The field was reset to empty.
    pub unresolved: usize,
    /// Entries whose path could not be followed. The object was not touched.
    pub invalid: usize,
}

impl RestoreReport {
    /// Returns `true` if every entry was restored.
    pub fn is_complete(&self) -> bool {
        self.unresolved == 0 && self.invalid == 0
    }

    pub fn total(&self) -> usize {
        self.restored + self.unresolved + self.invalid
    }
}

/// Collects external-resource links out of config objects and writes
/// resolved handles back into them.
pub struct ReferenceResolver;

impl ReferenceResolver {
    /// Walk `object` depth-first in field declaration order and record every
    /// set external-resource slot.
    ///
    /// Built-in resources are skipped with a warning: they cannot be
    /// restored on load.
    pub fn collect(object: &dyn Persist) -> ReferenceTable {
        let mut table = ReferenceTable::new();
        collect_into(object, None, &mut table);
        debug!(references = table.len(), "collected references");
        table
    }

    /// Resolve every entry of `table` through `locator` and write the
    /// handles into `object`.
    ///
    /// Each entry is independent: a bad path or a missing resource is
    /// logged and counted, and the remaining entries still run.
    pub fn restore(
        object: &mut dyn Persist,
        table: &ReferenceTable,
        locator: &dyn ResourceLocator,
    ) -> RestoreReport {
        let mut report = RestoreReport::default();
        for entry in table {
            let target = match FieldPath::parse(&entry.field_path) {
                Ok(path) => slot_at(&mut *object, path.steps(), &entry.field_path),
                Err(e) => Err(e),
            };
            let slot = match target {
                Ok(slot) => slot,
                Err(e) => {
                    warn!(path = %entry.field_path, error = %e, "skipping reference entry");
                    report.invalid += 1;
                    continue;
                }
            };

            match resolve(entry, locator) {
                Some(handle) => {
                    slot.set(Some(handle));
                    report.restored += 1;
                }
                None => {
                    warn!(
                        path = %entry.field_path,
                        id = %entry.external_id,
                        location = %entry.location,
                        "external resource not found; leaving field empty"
                    );
                    slot.set(None);
                    report.unresolved += 1;
                }
            }
        }
        debug!(?report, "restored references");
        report
    }
}

fn record(slot: &ResourceRef, path: FieldPath, table: &mut ReferenceTable) {
    let Some(handle) = slot.get() else {
        return;
    };
    if handle.is_addressable() {
        table.push(ReferenceEntry::from_handle(path.to_string(), handle));
    } else {
        warn!(
            path = %path,
            location = %handle.location,
            "skipping built-in resource; it will not be restored on load"
        );
    }
}

fn collect_into(object: &dyn Persist, prefix: Option<&FieldPath>, table: &mut ReferenceTable) {
    let field_path = |name: &str| match prefix {
        Some(p) => p.child(name),
        None => FieldPath::field(name),
    };
    let element_path = |name: &str, i: usize| match prefix {
        Some(p) => p.child_element(name, i),
        None => FieldPath::element(name, i),
    };

    for &name in object.field_names() {
        let Some(field) = object.field(name) else {
            warn!(field = name, "field listed by descriptor has no accessor");
            continue;
        };
        match field {
            FieldRef::Resource(slot) => record(slot, field_path(name), table),
            FieldRef::Resources(slots) => {
                for (i, slot) in slots.iter().enumerate() {
                    record(slot, element_path(name, i), table);
                }
            }
            FieldRef::Nested(Some(child)) => collect_into(child, Some(&field_path(name)), table),
            FieldRef::Nested(None) => {}
            FieldRef::NestedSeq(children) => {
                for (i, child) in children.into_iter().enumerate() {
                    collect_into(child, Some(&element_path(name, i)), table);
                }
            }
            FieldRef::Plain => {}
        }
    }
}

/// Follow `steps` from `object` to the resource slot they address.
fn slot_at<'a>(
    object: &'a mut dyn Persist,
    steps: &[PathStep],
    path: &str,
) -> Result<&'a mut ResourceRef> {
    let Some((step, rest)) = steps.split_first() else {
        return Err(RefError::NotAResourceField {
            path: path.to_string(),
        });
    };
    let name = step.name();
    let field = object
        .field_mut(name)
        .ok_or_else(|| RefError::FieldNotFound {
            path: path.to_string(),
            field: name.to_string(),
        })?;

    if rest.is_empty() {
        return match (step, field) {
            (PathStep::Field(_), FieldMut::Resource(slot)) => Ok(slot),
            (PathStep::Element(_, index), FieldMut::Resources(slots)) => {
                let len = slots.len();
                slots.get_mut(*index).ok_or(RefError::IndexOutOfRange {
                    path: path.to_string(),
                    index: *index,
                    len,
                })
            }
            _ => Err(RefError::NotAResourceField {
                path: path.to_string(),
            }),
        };
    }

    let child: &'a mut dyn Persist = match (step, field) {
        (PathStep::Field(_), FieldMut::Nested(Some(child))) => child,
        (PathStep::Field(_), FieldMut::Nested(None)) => {
            return Err(RefError::NullIntermediate {
                path: path.to_string(),
                field: name.to_string(),
            })
        }
        (PathStep::Element(_, index), FieldMut::NestedSeq(mut children)) => {
            let len = children.len();
            if *index >= len {
                return Err(RefError::IndexOutOfRange {
                    path: path.to_string(),
                    index: *index,
                    len,
                });
            }
            children.swap_remove(*index)
        }
        (PathStep::Element(..), _) => {
            return Err(RefError::NotASequence {
                path: path.to_string(),
                field: name.to_string(),
            })
        }
        (PathStep::Field(_), _) => {
            return Err(RefError::NotNested {
                path: path.to_string(),
                field: name.to_string(),
            })
        }
    };
    slot_at(child, rest, path)
}

/// Primary lookup by id, then fallback by location.
fn resolve(entry: &ReferenceEntry, locator: &dyn ResourceLocator) -> Option<ResourceHandle> {
    if !entry.external_id.is_empty() {
        let id = ResourceId::new(entry.external_id.as_str());
        if let Some(handle) = locator.by_id(&id, &entry.type_name) {
            return Some(handle);
        }
    }
    if entry.location.is_empty() {
        return None;
    }
    let handle = locator.by_location(&entry.location, &entry.type_name)?;
    debug!(
        path = %entry.field_path,
        location = %entry.location,
        "resolved reference by location fallback"
    );
    Some(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLocator;
    use crate::persist;
    use datacfg_codec::EnvelopeCodec;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Item {
        label: String,
        sprite: ResourceRef,
    }
    persist!(Item { plain label, resource sprite });

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Stats {
        power: u32,
        aura: ResourceRef,
    }
    persist!(Stats { plain power, resource aura });

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Inventory {
        a: u32,
        b: ResourceRef,
        c: u32,
        icons: Vec<ResourceRef>,
        items: Vec<Item>,
        stats: Stats,
        bonus: Option<Stats>,
        #[serde(skip)]
        preview: ResourceRef,
    }
    persist!(Inventory {
        plain a,
        resource b,
        plain c,
        resources icons,
        nested_seq items,
        nested stats,
        nested_opt bonus,
    });

    fn texture(id: &str) -> ResourceHandle {
        ResourceHandle::new(id, format!("art/{id}.png"), "Texture")
    }

    fn locator_with(ids: &[&str]) -> InMemoryLocator {
        let locator = InMemoryLocator::new();
        for id in ids {
            locator.insert(texture(id));
        }
        locator
    }

    fn item(label: &str, sprite: Option<&str>) -> Item {
        Item {
            label: label.into(),
            sprite: sprite.map(texture).into(),
        }
    }

    fn sample() -> Inventory {
        Inventory {
            a: 1,
            b: texture("b").into(),
            c: 3,
            icons: vec![texture("i0").into(), ResourceRef::none(), texture("i2").into()],
            items: vec![item("x", None), item("y", Some("s1")), item("z", Some("s2"))],
            stats: Stats {
                power: 9,
                aura: texture("aura").into(),
            },
            bonus: None,
            preview: texture("preview").into(),
        }
    }

    /// Serialize the payload through JSON so handle slots come back empty,
    /// as they do after a load.
    fn through_payload(inv: &Inventory) -> Inventory {
        let doc = EnvelopeCodec::encode_payload(inv).unwrap();
        EnvelopeCodec::decode_payload(&doc).unwrap()
    }

    #[test]
    fn collect_walks_in_declaration_order() {
        let table = ReferenceResolver::collect(&sample());
        let paths: Vec<&str> = table.iter().map(|e| e.field_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["b", "icons[0]", "icons[2]", "items[1].sprite", "items[2].sprite", "stats.aura"]
        );
    }

    #[test]
    fn collect_records_identity() {
        let table = ReferenceResolver::collect(&sample());
        let entry = table.get("stats.aura").unwrap();
        assert_eq!(entry.external_id, "aura");
        assert_eq!(entry.location, "art/aura.png");
        assert_eq!(entry.type_name, "Texture");
    }

    #[test]
    fn collect_skips_transient_fields() {
        let table = ReferenceResolver::collect(&sample());
        assert!(table.iter().all(|e| e.external_id != "preview"));
    }

    #[test]
    fn collect_skips_builtin_resources() {
        let mut inv = Inventory::default();
        inv.b = ResourceHandle::builtin("builtin/Default", "Material").into();
        inv.icons = vec![texture("i0").into()];
        let table = ReferenceResolver::collect(&inv);
        assert_eq!(table.len(), 1);
        assert_eq!(table.references[0].field_path, "icons[0]");
    }

    #[test]
    fn collect_descends_into_optional_nested() {
        let mut inv = Inventory::default();
        inv.bonus = Some(Stats {
            power: 1,
            aura: texture("bonus").into(),
        });
        let table = ReferenceResolver::collect(&inv);
        assert_eq!(table.get("bonus.aura").unwrap().external_id, "bonus");
    }

    #[test]
    fn roundtrip_restores_every_field() {
        let original = sample();
        let table = ReferenceResolver::collect(&original);
        let mut loaded = through_payload(&original);
        assert!(!loaded.b.is_set());
        assert_eq!(loaded.icons.len(), 3);

        let locator = locator_with(&["b", "i0", "i2", "s1", "s2", "aura"]);
        let report = ReferenceResolver::restore(&mut loaded, &table, &locator);
        assert!(report.is_complete());
        assert_eq!(report.restored, 6);

        let mut expected = original;
        expected.preview = ResourceRef::none();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn unresolvable_reference_leaves_zero_value() {
        let original = sample();
        let table = ReferenceResolver::collect(&original);
        let mut loaded = through_payload(&original);

        let locator = locator_with(&["i0", "i2", "s1", "s2", "aura"]);
        let report = ReferenceResolver::restore(&mut loaded, &table, &locator);
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.restored, 5);
        assert_eq!(loaded.a, 1);
        assert_eq!(loaded.c, 3);
        assert!(!loaded.b.is_set());
    }

    #[test]
    fn location_fallback() {
        let mut table = ReferenceTable::new();
        table.push(ReferenceEntry {
            field_path: "b".into(),
            external_id: "stale-id".into(),
            location: "art/b.png".into(),
            type_name: "Texture".into(),
            address: None,
        });
        let mut inv = Inventory::default();
        let report = ReferenceResolver::restore(&mut inv, &table, &locator_with(&["b"]));
        assert_eq!(report.restored, 1);
        assert_eq!(inv.b.get().unwrap().id.as_str(), "b");
    }

    #[test]
    fn indexed_path_sets_third_element() {
        let mut inv = Inventory::default();
        inv.items = vec![item("x", None), item("y", None), item("z", None)];
        let mut table = ReferenceTable::new();
        table.push(ReferenceEntry::from_handle("items[2].sprite", &texture("s")));

        let report = ReferenceResolver::restore(&mut inv, &table, &locator_with(&["s"]));
        assert_eq!(report.restored, 1);
        assert!(!inv.items[0].sprite.is_set());
        assert!(!inv.items[1].sprite.is_set());
        assert_eq!(inv.items[2].sprite.get().unwrap().id.as_str(), "s");
    }

    #[test]
    fn out_of_range_index_is_a_skipped_entry() {
        let mut inv = Inventory::default();
        inv.items = vec![item("x", None), item("y", None), item("z", None)];
        let mut table = ReferenceTable::new();
        table.push(ReferenceEntry::from_handle("items[9].sprite", &texture("s")));
        table.push(ReferenceEntry::from_handle("b", &texture("b")));

        let report = ReferenceResolver::restore(&mut inv, &table, &locator_with(&["s", "b"]));
        assert_eq!(report.invalid, 1);
        assert_eq!(report.restored, 1);
        assert!(inv.items.iter().all(|i| !i.sprite.is_set()));
        assert!(inv.b.is_set());
    }

    #[test]
    fn bad_entries_do_not_affect_others() {
        let mut inv = Inventory::default();
        let mut table = ReferenceTable::new();
        for path in ["items[x].sprite", "missing", "bonus.aura", "a", "a[0]", "icons[5]", "c.x"] {
            table.push(ReferenceEntry::from_handle(path, &texture("b")));
        }
        table.push(ReferenceEntry::from_handle("b", &texture("b")));

        let report = ReferenceResolver::restore(&mut inv, &table, &locator_with(&["b"]));
        assert_eq!(report.invalid, 7);
        assert_eq!(report.restored, 1);
        assert_eq!(report.total(), 8);
        assert!(inv.b.is_set());
    }

    #[test]
    fn slot_errors_are_specific() {
        let mut inv = Inventory::default();
        inv.items = vec![item("x", None)];

        let err = |p: &str, inv: &mut Inventory| {
            let path = FieldPath::parse(p).unwrap();
            slot_at(inv, path.steps(), p).map(|_| ()).unwrap_err()
        };
        assert!(matches!(err("nope", &mut inv), RefError::FieldNotFound { .. }));
        assert!(matches!(err("bonus.aura", &mut inv), RefError::NullIntermediate { .. }));
        assert!(matches!(err("a[0].x", &mut inv), RefError::NotASequence { .. }));
        assert!(matches!(err("a.x", &mut inv), RefError::NotNested { .. }));
        assert!(matches!(
            err("items[1].sprite", &mut inv),
            RefError::IndexOutOfRange { index: 1, len: 1, .. }
        ));
        assert!(matches!(err("items[0].label", &mut inv), RefError::NotAResourceField { .. }));
    }

    #[test]
    fn empty_table_is_a_noop() {
        let mut inv = sample();
        let before = inv.clone();
        let report =
            ReferenceResolver::restore(&mut inv, &ReferenceTable::new(), &InMemoryLocator::new());
        assert_eq!(report, RestoreReport::default());
        assert_eq!(inv, before);
    }
}
