//! Form state and validation for add/edit dialogs.

mod state;
pub mod validation;

pub use state::FormState;
pub use validation::{FieldError, ValidationErrors, ValidationResult, validate_field, validate_form};
