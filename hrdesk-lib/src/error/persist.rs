//! Persistence error types

use std::collections::BTreeMap;

/// Per-field error messages reported by the backend, keyed by field key.
pub type FieldErrors = BTreeMap<String, String>;

/// Error returned by a [`RecordHandler`](crate::store::RecordHandler).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PersistError {
    /// The backend rejected specific fields.
    #[error("{}", join_messages(.0))]
    Fields(FieldErrors),

    /// Any other failure.
    #[error("{0}")]
    Generic(String),
}

impl PersistError {
    /// Creates a generic error.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic(message.into())
    }

    /// Creates a single-field error.
    pub fn field(key: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(key.into(), message.into());
        Self::Fields(errors)
    }

    /// Interprets a raw error message from the backend.
    ///
    /// A JSON object whose members are strings or arrays of strings becomes
    /// [`PersistError::Fields`], taking the first message of each array.
    /// Members of any other shape are skipped. When nothing field-shaped is
    /// found the whole message becomes [`PersistError::Generic`].
    ///
    /// # Example
    ///
    /// ```
    /// use hrdesk_lib::error::PersistError;
    ///
    /// let err = PersistError::from_message(r#"{"name": ["This field must be unique."]}"#);
    /// assert_eq!(err, PersistError::field("name", "This field must be unique."));
    ///
    /// let err = PersistError::from_message("Internal Server Error");
    /// assert_eq!(err, PersistError::generic("Internal Server Error"));
    /// ```
    pub fn from_message(message: &str) -> Self {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str(message) else {
            return Self::Generic(message.to_string());
        };

        let errors: FieldErrors = map
            .into_iter()
            .filter_map(|(key, value)| first_message(value).map(|msg| (key, msg)))
            .collect();

        if errors.is_empty() {
            Self::Generic(message.to_string())
        } else {
            Self::Fields(errors)
        }
    }
}

fn first_message(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => items.into_iter().find_map(|item| match item {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        }),
        _ => None,
    }
}

fn join_messages(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(key, msg)| format!("{}: {}", key, msg))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_and_array_members() {
        let err = PersistError::from_message(
            r#"{"name": "Required", "code": ["Too long", "Invalid"], "status": 400}"#,
        );
        let PersistError::Fields(errors) = err else {
            panic!("expected field errors");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["name"], "Required");
        assert_eq!(errors["code"], "Too long");
    }

    #[test]
    fn test_non_field_shapes_are_generic() {
        assert_eq!(
            PersistError::from_message("[\"a\"]"),
            PersistError::generic("[\"a\"]")
        );
        assert_eq!(
            PersistError::from_message(r#"{"status": 500}"#),
            PersistError::generic(r#"{"status": 500}"#)
        );
        assert_eq!(
            PersistError::from_message("not json"),
            PersistError::generic("not json")
        );
    }

    #[test]
    fn test_display() {
        let err = PersistError::field("name", "Required");
        assert_eq!(err.to_string(), "name: Required");
        assert_eq!(PersistError::generic("boom").to_string(), "boom");
    }
}
