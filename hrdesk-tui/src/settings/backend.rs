use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::SettingsError;

/// Encoded bytes of one setting and when they were written.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredValue {
    pub bytes: Vec<u8>,
    pub updated_at: DateTime<Utc>,
}

/// One write in a [`SettingsBackend::apply`] batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Put { key: &'static str, bytes: Vec<u8> },
    Remove { key: &'static str },
}

impl Change {
    pub fn key(&self) -> &'static str {
        match self {
            Change::Put { key, .. } | Change::Remove { key } => key,
        }
    }
}

/// Storage behind a [`SettingsProvider`](super::SettingsProvider).
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// The value under `key`, if any.
    async fn fetch(&self, key: &str) -> Result<Option<StoredValue>, SettingsError>;

    /// Apply every change or none of them.
    async fn apply(&self, changes: Vec<Change>) -> Result<(), SettingsError>;

    /// Keys starting with `prefix` and their last write, ordered by key.
    async fn list(&self, prefix: &str) -> Result<Vec<(String, DateTime<Utc>)>, SettingsError>;
}
