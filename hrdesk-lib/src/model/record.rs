//! Dynamic record

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;

/// Ordered field map used for records, form payloads and patches.
pub type FieldMap = BTreeMap<String, Value>;

/// Key of the optional active flag carried by most admin records.
pub const ACTIVE_FLAG_KEY: &str = "is_active";

/// A record as returned by the backend: a numeric `id` plus arbitrary fields.
///
/// The record serializes as a flat JSON object, so `{"id": 3, "name": "QA"}`
/// deserializes into a record with id `3` and a single `name` field.
///
/// # Example
///
/// ```
/// use hrdesk_lib::model::Record;
///
/// let record = Record::new(7)
///     .set("name", "Night Shift")
///     .set("is_active", false);
///
/// assert_eq!(record.id(), 7);
/// assert_eq!(record.is_active(), Some(false));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The unique identifier of the record.
    pub(crate) id: i64,

    /// The field values, excluding `id`.
    #[serde(flatten)]
    pub(crate) fields: FieldMap,
}

impl Record {
    /// Creates a new empty record with the given id.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            fields: FieldMap::new(),
        }
    }

    /// Returns the record id.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Returns the active flag, if the record carries one as a boolean.
    pub fn is_active(&self) -> Option<bool> {
        self.get(ACTIVE_FLAG_KEY).and_then(Value::as_bool)
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// Returns a reference to the field value, if it exists.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns the field value, or `Value::Null` when absent.
    ///
    /// `id` is readable as a field so it can be used as a column key.
    pub fn value(&self, field: &str) -> Value {
        if field == "id" {
            return Value::Int(self.id);
        }
        self.fields.get(field).cloned().unwrap_or_default()
    }

    /// Returns `true` if the record contains the given field.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns a reference to all fields.
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    // =========================================================================
    // Setters
    // =========================================================================

    /// Sets a field value (builder pattern).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Inserts a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Removes a field and returns its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Applies a partial patch on top of the current fields.
    pub fn merge(&mut self, patch: &FieldMap) {
        for (key, value) in patch {
            if key != "id" {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_flat_object() {
        let record: Record =
            serde_json::from_str(r#"{"id": 3, "name": "QA", "is_active": true, "head": null}"#)
                .unwrap();

        assert_eq!(record.id(), 3);
        assert_eq!(record.value("name"), Value::from("QA"));
        assert_eq!(record.is_active(), Some(true));
        assert_eq!(record.get("head"), Some(&Value::Null));
        assert!(!record.contains("id"));
    }

    #[test]
    fn test_serialize_flat_object() {
        let record = Record::new(1).set("name", "HR");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": 1, "name": "HR"}));
    }

    #[test]
    fn test_missing_field_reads_null() {
        let record = Record::new(1);
        assert_eq!(record.value("nope"), Value::Null);
        assert_eq!(record.value("id"), Value::Int(1));
        assert_eq!(record.is_active(), None);
    }

    #[test]
    fn test_merge_ignores_id() {
        let mut record = Record::new(1).set("name", "HR");
        let mut patch = FieldMap::new();
        patch.insert("name".into(), "People".into());
        patch.insert("id".into(), Value::Int(99));
        record.merge(&patch);

        assert_eq!(record.id(), 1);
        assert_eq!(record.value("name"), Value::from("People"));
    }
}
