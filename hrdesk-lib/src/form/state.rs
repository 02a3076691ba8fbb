//! In-progress form data for the open dialog.

use crate::model::FieldMap;
use crate::model::Record;
use crate::model::Value;
use crate::schema::FieldKind;
use crate::schema::FieldSpec;
use crate::schema::defaults_for;

/// Values being edited in the currently open dialog.
///
/// For an add dialog the form starts from the field defaults. For an edit
/// dialog it starts empty on top of a snapshot of the record: reads fall
/// through to the snapshot, but only touched fields end up in the patch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    values: FieldMap,
    snapshot: Option<Record>,
}

impl FormState {
    /// Form for a new record, seeded with field defaults.
    pub fn for_add(fields: &[FieldSpec]) -> Self {
        Self {
            values: defaults_for(fields),
            snapshot: None,
        }
    }

    /// Form for editing an existing record.
    pub fn for_edit(record: Record) -> Self {
        Self {
            values: FieldMap::new(),
            snapshot: Some(record),
        }
    }

    /// The record this form edits, if any.
    pub fn snapshot(&self) -> Option<&Record> {
        self.snapshot.as_ref()
    }

    /// Set a field value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// The value entered in this form, ignoring the snapshot.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The value to display and validate: entered value over the snapshot.
    pub fn effective(&self, key: &str) -> Value {
        match self.values.get(key) {
            Some(value) => value.clone(),
            None => self
                .snapshot
                .as_ref()
                .map(|r| r.value(key))
                .unwrap_or_default(),
        }
    }

    /// Values entered in this form.
    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    /// Touched values, with number inputs converted from text.
    ///
    /// Readonly and unknown keys pass through untouched.
    pub fn coerced(&self, fields: &[FieldSpec]) -> FieldMap {
        self.values
            .iter()
            .map(|(key, value)| {
                let kind = fields.iter().find(|f| &f.key == key).map(|f| f.kind);
                (key.clone(), coerce(kind, value))
            })
            .collect()
    }

    /// Discard all values and the snapshot.
    pub fn clear(&mut self) {
        self.values.clear();
        self.snapshot = None;
    }
}

fn coerce(kind: Option<FieldKind>, value: &Value) -> Value {
    match kind {
        Some(FieldKind::Number) => value.parse_number().map(Value::number).unwrap_or_else(|| value.clone()),
        Some(FieldKind::Text) | Some(FieldKind::Time) | Some(FieldKind::Switch) | None => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name"),
            FieldSpec::number("grace_minutes", "Grace"),
            FieldSpec::switch("is_active", "Active"),
        ]
    }

    #[test]
    fn test_add_form_starts_with_defaults() {
        let form = FormState::for_add(&fields());
        assert_eq!(form.get("is_active"), Some(&Value::Bool(true)));
        assert_eq!(form.effective("name"), Value::Null);
    }

    #[test]
    fn test_edit_form_reads_through_snapshot() {
        let record = Record::new(4).set("name", "Morning").set("grace_minutes", 10i64);
        let mut form = FormState::for_edit(record);

        assert_eq!(form.effective("name"), Value::from("Morning"));
        assert!(form.values().is_empty());

        form.set("name", "Early");
        assert_eq!(form.effective("name"), Value::from("Early"));
        assert_eq!(form.values().len(), 1);
    }

    #[test]
    fn test_coerced_numbers() {
        let mut form = FormState::for_add(&fields());
        form.set("grace_minutes", " 15 ");
        form.set("name", "42");

        let data = form.coerced(&fields());
        assert_eq!(data["grace_minutes"], Value::Int(15));
        assert_eq!(data["name"], Value::from("42"));
    }
}
