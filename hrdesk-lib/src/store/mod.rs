//! Persistence boundary
//!
//! A [`ManagementTable`](crate::ManagementTable) never persists anything
//! itself. Add, edit and delete go through a [`RecordHandler`]; screens that
//! also need to refetch use a [`RecordStore`].

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::PersistError;
use crate::model::FieldMap;
use crate::model::Record;

/// Persistence callbacks for one collection.
///
/// Errors are returned, never thrown past the table: field-shaped failures
/// become inline messages, anything else a toast.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    /// Create a record from the submitted form data.
    async fn add(&self, data: FieldMap) -> Result<(), PersistError>;

    /// Apply a partial patch to a record.
    async fn edit(&self, id: i64, data: FieldMap) -> Result<(), PersistError>;

    /// Delete a record.
    async fn delete(&self, id: i64) -> Result<(), PersistError>;
}

/// A [`RecordHandler`] that can also list the collection.
#[async_trait]
pub trait RecordStore: RecordHandler {
    /// Fetch the full collection.
    async fn list(&self) -> Result<Vec<Record>, PersistError>;
}
