//! Column definitions.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::Cell;
use super::TableRecord;
use crate::error::SchemaError;
use crate::model::Value;

/// Renders one cell of a row.
pub type CellRenderer<R> = Arc<dyn Fn(&R) -> Cell + Send + Sync>;

/// Extracts the value a column sorts by.
pub type SortAccessor<R> = Arc<dyn Fn(&R) -> Value + Send + Sync>;

/// A table column definition.
///
/// # Example
///
/// ```
/// use hrdesk_lib::model::{Record, Value};
/// use hrdesk_lib::table::{Cell, Column};
///
/// let columns: Vec<Column<Record>> = vec![
///     Column::new("name", "Name").sortable(),
///     Column::new("grace_minutes", "Grace")
///         .sortable()
///         .cell(|r: &Record| Cell::text(format!("{} min", r.value("grace_minutes")))),
/// ];
/// ```
pub struct Column<R> {
    /// Unique key within the column set; also the default field to read.
    pub key: String,
    /// Header text.
    pub header: String,
    /// Custom cell renderer. Falls back to the raw field value as text.
    pub cell: Option<CellRenderer<R>>,
    /// Whether clicking the header sorts by this column.
    pub sortable: bool,
    /// Custom sort value. Falls back to the raw field value.
    pub sort_accessor: Option<SortAccessor<R>>,
}

impl<R: TableRecord> Column<R> {
    /// Create a new column reading the field named `key`.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            cell: None,
            sortable: false,
            sort_accessor: None,
        }
    }

    /// Make the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Set a custom cell renderer.
    pub fn cell<F>(mut self, render: F) -> Self
    where
        F: Fn(&R) -> Cell + Send + Sync + 'static,
    {
        self.cell = Some(Arc::new(render));
        self
    }

    /// Set a custom sort value.
    pub fn sort_by<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&R) -> Value + Send + Sync + 'static,
    {
        self.sort_accessor = Some(Arc::new(accessor));
        self
    }

    /// Render this column's cell for a row.
    pub fn render(&self, row: &R) -> Cell {
        match &self.cell {
            Some(render) => render(row),
            None => Cell::Text(row.field(&self.key).to_string()),
        }
    }

    /// The value this column sorts the row by.
    pub fn sort_value(&self, row: &R) -> Value {
        match &self.sort_accessor {
            Some(accessor) => accessor(row),
            None => row.field(&self.key),
        }
    }
}

impl<R> Clone for Column<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            header: self.header.clone(),
            cell: self.cell.clone(),
            sortable: self.sortable,
            sort_accessor: self.sort_accessor.clone(),
        }
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("custom_cell", &self.cell.is_some())
            .field("sortable", &self.sortable)
            .field("custom_sort", &self.sort_accessor.is_some())
            .finish()
    }
}

/// Checks that no two columns share a key.
pub fn check_columns<R>(columns: &[Column<R>]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            return Err(SchemaError::DuplicateColumn(column.key.clone()));
        }
    }
    Ok(())
}
