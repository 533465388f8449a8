//! Field classifier.
//!
//! Joins two snapshots on field identifier and sorts every identifier into
//! the buckets the migrator turns into operations.

use crate::snapshot::{FieldDescriptor, Snapshot};

/// A field whose external name changed while staying persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenamedField<'a> {
    /// Field identifier.
    pub id: &'a str,
    /// External name in the old snapshot.
    pub old_name: &'a str,
    /// External name in the new snapshot.
    pub new_name: &'a str,
}

/// A field present in both snapshots whose spec differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangedField<'a> {
    /// Field identifier.
    pub id: &'a str,
    /// Descriptor in the old snapshot.
    pub old: &'a FieldDescriptor,
    /// Descriptor in the new snapshot.
    pub new: &'a FieldDescriptor,
}

/// Result of joining two snapshots.
///
/// `renamed` and `changed` may share identifiers. Removed and added
/// fields are listed whether or not they are persisted. A persisted field
/// that turns virtual is listed as removed with its old descriptor, so its
/// column is dropped before any rename can take over the old name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification<'a> {
    /// Identifiers whose descriptor is identical on both sides.
    pub unchanged: Vec<&'a str>,
    /// Renamed persisted fields, in old declaration order.
    pub renamed: Vec<RenamedField<'a>>,
    /// Fields only in the old snapshot, and persisted fields that turned
    /// virtual, in old declaration order.
    pub removed: Vec<(&'a str, &'a FieldDescriptor)>,
    /// Fields only in the new snapshot, in new declaration order.
    pub added: Vec<(&'a str, &'a FieldDescriptor)>,
    /// Fields whose spec differs byte for byte, in old declaration order.
    pub changed: Vec<ChangedField<'a>>,
}

/// Classifies the fields of `old` and `new`.
#[must_use]
pub fn classify<'a>(old: &'a Snapshot, new: &'a Snapshot) -> Classification<'a> {
    let mut classification = Classification::default();

    for (id, old_field) in old.iter() {
        let Some(new_field) = new.get(id) else {
            classification.removed.push((id, old_field));
            continue;
        };

        if old_field == new_field {
            classification.unchanged.push(id);
            continue;
        }

        if old_field.is_persisted() && !new_field.is_persisted() {
            classification.removed.push((id, old_field));
            continue;
        }

        if old_field.name != new_field.name && old_field.is_persisted() && new_field.is_persisted() {
            classification.renamed.push(RenamedField {
                id,
                old_name: &old_field.name,
                new_name: &new_field.name,
            });
        }

        if old_field.spec != new_field.spec {
            classification.changed.push(ChangedField {
                id,
                old: old_field,
                new: new_field,
            });
        }
    }

    classification.added = new.iter().filter(|(id, _)| !old.contains(id)).collect();

    classification
}

#[cfg(test)]
mod tests {
    use super::*;

    fn old() -> Snapshot {
        Snapshot::new()
            .with_field("ID", FieldDescriptor::new("id", "field:bigserial primary key"))
            .with_field("Name", FieldDescriptor::new("name", "field:text"))
            .with_field("Email", FieldDescriptor::new("email", "field:text"))
            .with_field("Legacy", FieldDescriptor::new("legacy", "field:int"))
            .with_field("Cache", FieldDescriptor::virtual_field("cache"))
    }

    fn new() -> Snapshot {
        Snapshot::new()
            .with_field("ID", FieldDescriptor::new("id", "field:bigserial primary key"))
            .with_field("Name", FieldDescriptor::new("full_name", "field:text"))
            .with_field("Email", FieldDescriptor::new("email", "field:text not null"))
            .with_field("Cache", FieldDescriptor::virtual_field("cache_v2"))
            .with_field("Age", FieldDescriptor::new("age", "field:int"))
            .with_field("Display", FieldDescriptor::virtual_field("display"))
    }

    #[test]
    fn test_classify_buckets() {
        let (old, new) = (old(), new());
        let c = classify(&old, &new);

        assert_eq!(c.unchanged, vec!["ID"]);
        assert_eq!(
            c.renamed,
            vec![RenamedField {
                id: "Name",
                old_name: "name",
                new_name: "full_name",
            }]
        );
        assert_eq!(
            c.removed.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec!["Legacy"]
        );
        assert_eq!(
            c.added.iter().map(|(id, _)| *id).collect::<Vec<_>>(),
            vec!["Age", "Display"]
        );
        assert_eq!(c.changed.len(), 1);
        assert_eq!(c.changed[0].id, "Email");
    }

    #[test]
    fn test_virtual_rename_is_not_a_rename() {
        let (old, new) = (old(), new());
        let c = classify(&old, &new);
        assert!(c.renamed.iter().all(|r| r.id != "Cache"));
        assert!(c.changed.iter().all(|f| f.id != "Cache"));
    }

    #[test]
    fn test_rename_with_spec_change_is_in_both_buckets() {
        let old = Snapshot::new().with_field("A", FieldDescriptor::new("a", "field:int"));
        let new = Snapshot::new().with_field("A", FieldDescriptor::new("b", "field:bigint"));
        let c = classify(&old, &new);

        assert_eq!(c.renamed.len(), 1);
        assert_eq!(c.changed.len(), 1);
    }

    #[test]
    fn test_virtualized_field_is_removed() {
        let old = Snapshot::new()
            .with_field("A", FieldDescriptor::new("x", "field:int"))
            .with_field("B", FieldDescriptor::new("y", "field:int"));
        let new = Snapshot::new()
            .with_field("A", FieldDescriptor::new("x", "computed"))
            .with_field("B", FieldDescriptor::new("x", "field:int"));
        let c = classify(&old, &new);

        assert_eq!(c.removed.len(), 1);
        assert_eq!(c.removed[0].0, "A");
        assert_eq!(c.removed[0].1.name, "x");
        assert!(c.changed.is_empty());
        assert_eq!(
            c.renamed,
            vec![RenamedField {
                id: "B",
                old_name: "y",
                new_name: "x",
            }]
        );
    }

    #[test]
    fn test_identical_snapshots() {
        let old = old();
        let c = classify(&old, &old);
        assert_eq!(c.unchanged.len(), old.len());
        assert!(c.renamed.is_empty());
        assert!(c.removed.is_empty());
        assert!(c.added.is_empty());
        assert!(c.changed.is_empty());
    }
}
