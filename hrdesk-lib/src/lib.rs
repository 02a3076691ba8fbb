//! HR dashboard table core
//!
//! Headless building blocks for the admin screens of the HR dashboard: a
//! sortable, paginated table and a management table that layers schema-driven
//! add/edit forms, validation and confirmation-gated deletion on top of it.
//! Persistence is delegated to a [`store::RecordHandler`].

pub mod api;
pub mod error;
pub mod form;
pub mod manage;
pub mod model;
pub mod schema;
pub mod store;
pub mod table;

pub use manage::ManagementTable;
pub use model::{FieldMap, Record, Value};
pub use schema::{FieldKind, FieldSpec};
pub use table::{Column, SortableTable, TableRecord};
