//! Default value resolution for new records.

use super::FieldKind;
use super::FieldSpec;
use crate::model::ACTIVE_FLAG_KEY;
use crate::model::FieldMap;
use crate::model::Value;

/// Default for a switch field on a new record.
///
/// The active flag starts on; every other switch starts off.
pub fn default_switch_value(key: &str) -> bool {
    key == ACTIVE_FLAG_KEY
}

/// Default value a field takes when the add dialog opens.
///
/// Only switches have one; other kinds start empty.
pub fn default_value(field: &FieldSpec) -> Option<Value> {
    match field.kind {
        FieldKind::Switch => Some(Value::Bool(default_switch_value(&field.key))),
        FieldKind::Text | FieldKind::Number | FieldKind::Time => None,
    }
}

/// Collects the defaults of all non-readonly fields.
pub fn defaults_for(fields: &[FieldSpec]) -> FieldMap {
    fields
        .iter()
        .filter(|f| !f.readonly)
        .filter_map(|f| default_value(f).map(|v| (f.key.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_flag_defaults_on() {
        assert!(default_switch_value("is_active"));
        assert!(!default_switch_value("is_remote"));
    }

    #[test]
    fn test_defaults_only_for_switches() {
        let fields = vec![
            FieldSpec::text("name", "Name"),
            FieldSpec::number("grace_minutes", "Grace"),
            FieldSpec::switch("is_active", "Active"),
            FieldSpec::switch("is_night", "Night"),
            FieldSpec::switch("is_locked", "Locked").readonly(),
        ];

        let defaults = defaults_for(&fields);
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults.get("is_active"), Some(&Value::Bool(true)));
        assert_eq!(defaults.get("is_night"), Some(&Value::Bool(false)));
    }
}
