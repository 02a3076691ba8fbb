//! Declarative field schema
//!
//! A [`FieldSpec`] list drives both the add/edit form and the default table
//! columns of a [`ManagementTable`](crate::ManagementTable).

mod defaults;

pub use defaults::*;

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::error::SchemaError;

/// The input kind of a field.
///
/// Every consumer matches this exhaustively, so adding a kind forces the form
/// renderer, validator and column derivation to handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text, required.
    Text,
    /// Boolean toggle, never required.
    Switch,
    /// Numeric input, required and finite.
    Number,
    /// Time of day (`HH:MM`), required.
    Time,
}

impl FieldKind {
    /// Returns the lowercase name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Switch => "switch",
            FieldKind::Number => "number",
            FieldKind::Time => "time",
        }
    }
}

/// Description of one form/display field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Record attribute this field reads and writes.
    pub key: String,
    /// Human-readable label, also used in validation messages.
    pub label: String,
    /// Input kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Readonly fields are shown but never validated or edited.
    #[serde(default)]
    pub readonly: bool,
}

impl FieldSpec {
    /// Creates a new field.
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            readonly: false,
        }
    }

    /// Creates a text field.
    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    /// Creates a switch field.
    pub fn switch(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Switch)
    }

    /// Creates a number field.
    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    /// Creates a time field.
    pub fn time(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Time)
    }

    /// Marks the field readonly.
    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }
}

/// Checks that no two fields share a key.
pub fn check_fields(fields: &[FieldSpec]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.key.as_str()) {
            return Err(SchemaError::DuplicateField(field.key.clone()));
        }
    }
    Ok(())
}

/// Finds a field by key.
pub fn find_field<'a>(fields: &'a [FieldSpec], key: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|f| f.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_field_spec() {
        let field: FieldSpec =
            serde_json::from_str(r#"{"key": "start_time", "label": "Start", "type": "time"}"#)
                .unwrap();
        assert_eq!(field, FieldSpec::time("start_time", "Start"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let fields = vec![
            FieldSpec::text("name", "Name"),
            FieldSpec::switch("name", "Name again"),
        ];
        assert!(matches!(
            check_fields(&fields),
            Err(SchemaError::DuplicateField(key)) if key == "name"
        ));
    }
}
