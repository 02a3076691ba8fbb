//! In-memory record store using DashMap

use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;

use super::RecordHandler;
use super::RecordStore;
use crate::error::PersistError;
use crate::model::FieldMap;
use crate::model::Record;
use crate::model::Value;

/// An in-memory collection backed by a concurrent hash map.
///
/// Ids are assigned sequentially. Unique keys reject duplicates (compared
/// case-insensitively after trimming) with a field error, the same shape a
/// REST backend reports. Data is lost when the process exits.
///
/// # Example
///
/// ```
/// use hrdesk_lib::model::Record;
/// use hrdesk_lib::store::MemoryStore;
///
/// let store = MemoryStore::new("role")
///     .unique("name")
///     .with_records([Record::new(1).set("name", "Admin")]);
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    entity: String,
    store: DashMap<i64, Record>,
    next_id: AtomicI64,
    unique_keys: Vec<String>,
}

impl MemoryStore {
    /// Creates a new empty store. `entity` names records in error messages.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            store: DashMap::new(),
            next_id: AtomicI64::new(1),
            unique_keys: Vec::new(),
        }
    }

    /// Adds a uniqueness constraint on a field.
    pub fn unique(mut self, key: impl Into<String>) -> Self {
        self.unique_keys.push(key.into());
        self
    }

    /// Seeds the store. Later ids continue after the highest seeded id.
    pub fn with_records(self, records: impl IntoIterator<Item = Record>) -> Self {
        for record in records {
            self.next_id.fetch_max(record.id() + 1, Ordering::SeqCst);
            self.store.insert(record.id(), record);
        }
        self
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns a copy of a record.
    pub fn get(&self, id: i64) -> Option<Record> {
        self.store.get(&id).map(|entry| entry.value().clone())
    }

    fn check_unique(&self, data: &FieldMap, exclude: Option<i64>) -> Result<(), PersistError> {
        let mut errors = crate::error::FieldErrors::new();
        for key in &self.unique_keys {
            let Some(candidate) = data.get(key).and_then(normalized) else {
                continue;
            };
            let taken = self.store.iter().any(|entry| {
                Some(*entry.key()) != exclude
                    && entry.value().get(key).and_then(normalized).as_deref()
                        == Some(candidate.as_str())
            });
            if taken {
                errors.insert(
                    key.clone(),
                    format!("{} with this {} already exists.", self.entity, key),
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(PersistError::Fields(errors))
        }
    }

    fn not_found(&self, id: i64) -> PersistError {
        PersistError::Generic(format!("No {} found with id {}", self.entity, id))
    }
}

fn normalized(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string().trim().to_lowercase()),
    }
}

#[async_trait]
impl RecordHandler for MemoryStore {
    async fn add(&self, data: FieldMap) -> Result<(), PersistError> {
        self.check_unique(&data, None)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut record = Record::new(id);
        record.merge(&data);
        self.store.insert(id, record);
        debug!("Created {} {}", self.entity, id);
        Ok(())
    }

    async fn edit(&self, id: i64, data: FieldMap) -> Result<(), PersistError> {
        if !self.store.contains_key(&id) {
            return Err(self.not_found(id));
        }
        self.check_unique(&data, Some(id))?;
        let mut entry = self.store.get_mut(&id).ok_or_else(|| self.not_found(id))?;
        entry.value_mut().merge(&data);
        debug!("Updated {} {} ({} fields)", self.entity, id, data.len());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), PersistError> {
        match self.store.remove(&id) {
            Some(_) => {
                debug!("Deleted {} {}", self.entity, id);
                Ok(())
            }
            None => Err(self.not_found(id)),
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Record>, PersistError> {
        let mut records: Vec<Record> = self
            .store
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(Record::id);
        Ok(records)
    }
}
