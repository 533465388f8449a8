//! Table snapshots.
//!
//! A [`Snapshot`] maps stable field identifiers to [`FieldDescriptor`]s.
//! The identifier is the join key between two snapshots: a field keeps its
//! identifier when its external name changes, which is how renames are
//! detected.
//!
//! Snapshots keep declaration order so that CREATE TABLE lists columns the
//! way they were declared and diff output is deterministic.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MigrateError, Result};
use crate::grammar::FIELD_MARKER;

/// What a snapshot records about one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Name used in generated SQL.
    #[serde(alias = "json")]
    pub name: String,
    /// Raw constraint spec. Empty, or lacking the `field:` marker, for
    /// attributes that are not persisted.
    #[serde(default, alias = "db")]
    pub spec: String,
}

impl FieldDescriptor {
    /// Creates a new field descriptor.
    #[must_use]
    pub fn new(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spec: spec.into(),
        }
    }

    /// Creates a descriptor for an attribute that has no column.
    #[must_use]
    pub fn virtual_field(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// Returns the column body (type and clauses) if the field is persisted.
    #[must_use]
    pub fn column_body(&self) -> Option<&str> {
        self.spec
            .split_once(FIELD_MARKER)
            .map(|(_, body)| body.trim())
    }

    /// Returns true if the field maps to a database column.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.column_body().is_some()
    }
}

/// Point-in-time description of a table's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    fields: Vec<(String, FieldDescriptor)>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field, replacing any field with the same identifier.
    #[must_use]
    pub fn with_field(mut self, id: impl Into<String>, field: FieldDescriptor) -> Self {
        self.insert(id, field);
        self
    }

    /// Inserts a field. An existing field with the same identifier is
    /// replaced in place and returned.
    pub fn insert(&mut self, id: impl Into<String>, field: FieldDescriptor) -> Option<FieldDescriptor> {
        let id = id.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => Some(std::mem::replace(slot, field)),
            None => {
                self.fields.push((id, field));
                None
            }
        }
    }

    /// Looks up a field by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, field)| field)
    }

    /// Returns true if the identifier is present.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldDescriptor)> {
        self.fields.iter().map(|(id, field)| (id.as_str(), field))
    }

    /// Iterates persisted fields as `(external name, column body)`.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(_, field)| {
            field
                .column_body()
                .map(|body| (field.name.as_str(), body))
        })
    }

    /// Returns the number of fields, persisted or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the snapshot has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses a snapshot from JSON.
    ///
    /// Anything other than a JSON object is rejected with
    /// [`MigrateError::InvalidInput`].
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(MigrateError::InvalidInput {
                found: json_kind(&value),
            });
        }
        // Re-parse from text: `serde_json::Map` does not keep key order.
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reads a baseline snapshot from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Writes the snapshot to a file as the next baseline.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl<I: Into<String>> FromIterator<(I, FieldDescriptor)> for Snapshot {
    fn from_iter<T: IntoIterator<Item = (I, FieldDescriptor)>>(iter: T) -> Self {
        let mut snapshot = Self::new();
        for (id, field) in iter {
            snapshot.insert(id, field);
        }
        snapshot
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (id, field) in &self.fields {
            map.serialize_entry(id, field)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(SnapshotVisitor)
    }
}

struct SnapshotVisitor;

impl<'de> Visitor<'de> for SnapshotVisitor {
    type Value = Snapshot;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of field identifiers to field descriptors")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Snapshot, A::Error> {
        let mut snapshot = Snapshot::new();
        while let Some((id, field)) = access.next_entry::<String, FieldDescriptor>()? {
            snapshot.insert(id, field);
        }
        Ok(snapshot)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Produces the snapshot of a record type.
///
/// Usually implemented with `#[derive(Describe)]` from `colspec-derive`.
pub trait Describe {
    /// Table the record type is stored in.
    const TABLE_NAME: &'static str;

    /// Returns the record type's current snapshot.
    fn describe() -> Snapshot;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Snapshot {
        Snapshot::new()
            .with_field("ID", FieldDescriptor::new("id", "field:bigserial not null primary key"))
            .with_field("Email", FieldDescriptor::new("email", "field:text not null unique"))
            .with_field("Token", FieldDescriptor::virtual_field("token"))
    }

    #[test]
    fn test_column_body() {
        let field = FieldDescriptor::new("id", "field:bigserial not null");
        assert_eq!(field.column_body(), Some("bigserial not null"));
        assert!(field.is_persisted());

        let field = FieldDescriptor::new("id", "  field: int ");
        assert_eq!(field.column_body(), Some("int"));

        assert!(!FieldDescriptor::virtual_field("x").is_persisted());
        assert!(!FieldDescriptor::new("x", "computed").is_persisted());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut snapshot = users();
        let previous = snapshot.insert("ID", FieldDescriptor::new("id", "field:int"));

        assert_eq!(previous.map(|f| f.spec), Some("field:bigserial not null primary key".to_string()));
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.iter().next().map(|(id, _)| id), Some("ID"));
        assert_eq!(snapshot.get("ID").map(|f| f.spec.as_str()), Some("field:int"));
    }

    #[test]
    fn test_columns_skip_virtual_fields() {
        let binding = users();
        let columns: Vec<_> = binding.columns().collect();
        assert_eq!(
            columns,
            vec![
                ("id", "bigserial not null primary key"),
                ("email", "text not null unique"),
            ]
        );
    }

    #[test]
    fn test_json_preserves_declaration_order() {
        let json = users().to_json().unwrap();
        let parsed = Snapshot::from_json(&json).unwrap();

        assert_eq!(parsed, users());
        let ids: Vec<_> = parsed.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["ID", "Email", "Token"]);
    }

    #[test]
    fn test_from_json_accepts_legacy_keys() {
        let json = r#"{
            "ResetToken": {"json": "token", "db": "field:text default('bye')"},
            "Meta": {"json": "meta"}
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();

        assert_eq!(
            snapshot.get("ResetToken"),
            Some(&FieldDescriptor::new("token", "field:text default('bye')"))
        );
        assert_eq!(snapshot.get("Meta"), Some(&FieldDescriptor::virtual_field("meta")));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        for (json, kind) in [("[1, 2]", "an array"), ("null", "null"), ("\"users\"", "a string")] {
            match Snapshot::from_json(json) {
                Err(MigrateError::InvalidInput { found }) => assert_eq!(found, kind),
                other => panic!("Expected InvalidInput for {json}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_from_json_reports_malformed_json() {
        assert!(matches!(
            Snapshot::from_json("{"),
            Err(MigrateError::Serialization(_))
        ));
    }

    #[test]
    fn test_collect_from_iterator() {
        let snapshot: Snapshot = [
            ("A", FieldDescriptor::new("a", "field:int")),
            ("B", FieldDescriptor::new("b", "field:text")),
        ]
        .into_iter()
        .collect();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains("B"));
        assert!(!snapshot.contains("C"));
    }
}
