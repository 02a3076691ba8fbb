//! Management table: CRUD workflow over a SortableTable
//!
//! A [`ManagementTable`] pairs a record collection with a field schema. The
//! schema generates the add/edit form and, unless explicit columns are given,
//! the table columns. The table owns all dialog, form and validation state and
//! turns user intent into requests for a
//! [`RecordHandler`](crate::store::RecordHandler); it never keeps a copy of
//! the data beyond what the caller last passed to
//! [`ManagementTable::set_items`].
//!
//! Each operation comes in two shapes: a synchronous `begin`/`finish` pair for
//! callers that run requests on their own executor, and an `async` helper that
//! awaits the handler inline.
//!
//! # Example
//!
//! ```ignore
//! let mut roles = ManagementTable::new("Role", vec![
//!     FieldSpec::text("name", "Name"),
//!     FieldSpec::switch("is_active", "Active"),
//! ])?;
//! roles.set_items(store.list().await?);
//!
//! roles.open_add();
//! roles.input("name", "Auditor");
//! if let Ok(SubmitOutcome::Saved) = roles.submit(&store).await {
//!     roles.set_items(store.list().await?);
//! }
//! ```

mod columns;
mod dialog;
mod table;
mod toast;

pub use columns::*;
pub use dialog::*;
pub use table::*;
pub use toast::*;
