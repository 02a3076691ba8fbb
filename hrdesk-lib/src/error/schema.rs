//! Schema error types

/// Errors raised while assembling a table from fields and columns.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two columns share a key.
    #[error("Duplicate column key '{0}'")]
    DuplicateColumn(String),

    /// Two fields share a key.
    #[error("Duplicate field key '{0}'")]
    DuplicateField(String),
}
