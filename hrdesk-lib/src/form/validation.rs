//! Submit-time validation of form fields.
//!
//! Rules depend only on the field kind:
//!
//! - readonly fields are skipped
//! - text and time fields are required (non-blank)
//! - number fields are required and must parse to a finite number
//! - switch fields always pass

use super::FormState;
use crate::model::Value;
use crate::schema::FieldKind;
use crate::schema::FieldSpec;

/// Information about a single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field key.
    pub field: String,
    /// Error message.
    pub message: String,
}

/// Result of validating a form.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ValidationResult {
    /// All fields passed validation.
    #[default]
    Valid,
    /// One or more fields failed validation.
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    /// Get all validation errors.
    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }
}

/// Validates one field value.
///
/// Returns the error message, or `None` when the value is acceptable.
pub fn validate_field(field: &FieldSpec, value: &Value) -> Option<String> {
    if field.readonly {
        return None;
    }
    match field.kind {
        FieldKind::Text | FieldKind::Time => {
            value.is_blank().then(|| format!("{} is required", field.label))
        }
        FieldKind::Number => {
            if value.is_blank() {
                Some(format!("{} is required", field.label))
            } else if value.parse_number().is_none() {
                Some(format!("{} must be a valid number", field.label))
            } else {
                None
            }
        }
        FieldKind::Switch => None,
    }
}

/// Validates every field of a form.
///
/// All failing fields are reported together, in schema order.
pub fn validate_form(fields: &[FieldSpec], form: &FormState) -> ValidationResult {
    let errors: Vec<FieldError> = fields
        .iter()
        .filter_map(|field| {
            validate_field(field, &form.effective(&field.key)).map(|message| FieldError {
                field: field.key.clone(),
                message,
            })
        })
        .collect();

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}

/// Field error messages shown inline in the open dialog.
///
/// Keeps insertion order so errors display in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(String, String)>,
}

impl ValidationErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message for a field, replacing any previous one.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(key, _)| *key == field) {
            Some(entry) => entry.1 = message,
            None => self.entries.push((field, message)),
        }
    }

    /// Get the message for a field.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, msg)| msg.as_str())
    }

    /// Remove the message for a field.
    pub fn remove(&mut self, field: &str) -> Option<String> {
        let index = self.entries.iter().position(|(key, _)| key == field)?;
        Some(self.entries.remove(index).1)
    }

    /// Remove all messages.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns `true` if there are no messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fields with messages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate `(field, message)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, m)| (k.as_str(), m.as_str()))
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        let mut out = Self::new();
        for error in errors {
            out.insert(error.field, error.message);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_time_required() {
        let name = FieldSpec::text("name", "Name");
        assert_eq!(
            validate_field(&name, &Value::Null).as_deref(),
            Some("Name is required")
        );
        assert_eq!(
            validate_field(&name, &Value::from("  ")).as_deref(),
            Some("Name is required")
        );
        assert_eq!(validate_field(&name, &Value::from("HR")), None);

        let start = FieldSpec::time("start_time", "Start Time");
        assert_eq!(
            validate_field(&start, &Value::from("")).as_deref(),
            Some("Start Time is required")
        );
    }

    #[test]
    fn test_number_rules() {
        let grace = FieldSpec::number("grace_minutes", "Grace Minutes");
        assert_eq!(
            validate_field(&grace, &Value::Null).as_deref(),
            Some("Grace Minutes is required")
        );
        assert_eq!(
            validate_field(&grace, &Value::from("ten")).as_deref(),
            Some("Grace Minutes must be a valid number")
        );
        assert_eq!(validate_field(&grace, &Value::from("10")), None);
        assert_eq!(validate_field(&grace, &Value::Int(0)), None);
    }

    #[test]
    fn test_switch_and_readonly_always_pass() {
        let active = FieldSpec::switch("is_active", "Active");
        assert_eq!(validate_field(&active, &Value::Null), None);

        let code = FieldSpec::text("code", "Code").readonly();
        assert_eq!(validate_field(&code, &Value::Null), None);
    }

    #[test]
    fn test_form_reports_all_errors() {
        let fields = vec![
            FieldSpec::text("name", "Name"),
            FieldSpec::time("start_time", "Start"),
            FieldSpec::switch("is_active", "Active"),
        ];
        let form = FormState::for_add(&fields);

        let result = validate_form(&fields, &form);
        let keys: Vec<&str> = result.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(keys, vec!["name", "start_time"]);
    }

    #[test]
    fn test_errors_replace_and_remove() {
        let mut errors = ValidationErrors::new();
        errors.insert("name", "Name is required");
        errors.insert("code", "Code is required");
        errors.insert("name", "Taken");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Taken"));
        assert_eq!(errors.remove("name").as_deref(), Some("Taken"));
        assert_eq!(errors.iter().next(), Some(("code", "Code is required")));
    }
}
