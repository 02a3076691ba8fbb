//! Sortable, paginated table
//!
//! [`SortableTable`] renders any slice of [`TableRecord`]s into a
//! [`TableView`]: headers with sort indicators, the current page of rows, or
//! a loading/empty placeholder. It owns only its sort and page state and
//! never mutates the data it is given.

mod column;
mod page;
mod sort;
mod view;

pub use column::*;
pub use page::*;
pub use sort::*;
pub use view::*;

use crate::model::Record;
use crate::model::Value;

/// Trait for records that can be displayed in a [`SortableTable`].
///
/// # Example
///
/// ```
/// use hrdesk_lib::model::Value;
/// use hrdesk_lib::table::TableRecord;
///
/// #[derive(Clone)]
/// struct Leave {
///     id: i64,
///     days: i64,
/// }
///
/// impl TableRecord for Leave {
///     fn id(&self) -> i64 {
///         self.id
///     }
///
///     fn field(&self, key: &str) -> Value {
///         match key {
///             "days" => Value::Int(self.days),
///             _ => Value::Null,
///         }
///     }
/// }
/// ```
pub trait TableRecord: Clone + Send + Sync + 'static {
    /// Unique numeric identifier.
    fn id(&self) -> i64;

    /// Raw value of a field; unknown keys read as `Value::Null`.
    fn field(&self, key: &str) -> Value;
}

impl TableRecord for Record {
    fn id(&self) -> i64 {
        self.id
    }

    fn field(&self, key: &str) -> Value {
        self.value(key)
    }
}

/// Rendered content of one table cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Plain text.
    Text(String),
    /// Inline boolean toggle bound to a record field.
    Toggle {
        /// Field the toggle writes.
        key: String,
        /// Current state.
        on: bool,
    },
}

impl Cell {
    /// Creates a text cell.
    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(text.into())
    }
}
