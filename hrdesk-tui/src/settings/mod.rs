//! Persistent typed settings.
//!
//! Keys are declared once as [`Setting`] constants carrying their value type,
//! so reads and writes of the same key cannot disagree on the encoding.

mod backend;
mod sqlite;

pub use backend::{Change, SettingsBackend, StoredValue};
pub use sqlite::SqliteBackend;

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use log::debug;
use thiserror::Error;

/// Settings error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("database error: {0}")]
    Database(#[from] async_sqlite::Error),
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        source: bincode::Error,
    },
    #[error("failed to decode {key}: {source}")]
    Decode {
        key: &'static str,
        source: bincode::Error,
    },
}

/// A settings key and the type stored under it.
pub struct Setting<T> {
    key: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Setting<T> {
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _type: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }
}

/// Typed access to a [`SettingsBackend`], encoding values with bincode.
#[derive(Clone)]
pub struct SettingsProvider {
    backend: Arc<dyn SettingsBackend>,
}

impl SettingsProvider {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Read a setting, `None` if it was never written.
    pub async fn get<T: DeserializeOwned>(
        &self,
        setting: &Setting<T>,
    ) -> Result<Option<T>, SettingsError> {
        let Some(stored) = self.backend.fetch(setting.key).await? else {
            return Ok(None);
        };
        bincode::deserialize(&stored.bytes)
            .map(Some)
            .map_err(|source| SettingsError::Decode {
                key: setting.key,
                source,
            })
    }

    /// Read a setting, falling back to `default`.
    pub async fn get_or<T: DeserializeOwned>(
        &self,
        setting: &Setting<T>,
        default: T,
    ) -> Result<T, SettingsError> {
        Ok(self.get(setting).await?.unwrap_or(default))
    }

    /// When a setting was last written.
    pub async fn updated_at<T>(
        &self,
        setting: &Setting<T>,
    ) -> Result<Option<DateTime<Utc>>, SettingsError> {
        Ok(self
            .backend
            .fetch(setting.key)
            .await?
            .map(|stored| stored.updated_at))
    }

    /// Write a setting.
    pub async fn set<T: Serialize>(&self, setting: &Setting<T>, value: &T) -> Result<(), SettingsError> {
        self.batch().set(setting, value)?.commit().await
    }

    /// Remove a setting.
    pub async fn clear<T>(&self, setting: &Setting<T>) -> Result<(), SettingsError> {
        self.batch().clear(setting).commit().await
    }

    /// Start a group of writes that is stored atomically.
    pub fn batch(&self) -> SettingsBatch<'_> {
        SettingsBatch {
            provider: self,
            changes: Vec::new(),
        }
    }

    /// Stored keys under a prefix such as `"api."` with their last write.
    pub async fn entries(&self, prefix: &str) -> Result<Vec<(String, DateTime<Utc>)>, SettingsError> {
        self.backend.list(prefix).await
    }
}

/// Pending writes from [`SettingsProvider::batch`].
pub struct SettingsBatch<'a> {
    provider: &'a SettingsProvider,
    changes: Vec<Change>,
}

impl SettingsBatch<'_> {
    pub fn set<T: Serialize>(mut self, setting: &Setting<T>, value: &T) -> Result<Self, SettingsError> {
        let bytes = bincode::serialize(value).map_err(|source| SettingsError::Encode {
            key: setting.key,
            source,
        })?;
        self.changes.push(Change::Put {
            key: setting.key,
            bytes,
        });
        Ok(self)
    }

    pub fn clear<T>(mut self, setting: &Setting<T>) -> Self {
        self.changes.push(Change::Remove { key: setting.key });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Store every change, or none if any fails.
    pub async fn commit(self) -> Result<(), SettingsError> {
        let keys: Vec<&str> = self.changes.iter().map(Change::key).collect();
        debug!("Saving settings: {}", keys.join(", "));
        self.provider.backend.apply(self.changes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: Setting<String> = Setting::new("test.name");
    const LIMIT: Setting<u32> = Setting::new("test.limit");
    const OTHER: Setting<bool> = Setting::new("other.flag");

    async fn provider(dir: &tempfile::TempDir) -> SettingsProvider {
        let backend = SqliteBackend::open(dir.path().join("settings.db"))
            .await
            .unwrap();
        SettingsProvider::new(backend)
    }

    #[tokio::test]
    async fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let settings = provider(&dir).await;

        assert_eq!(settings.get(&NAME).await.unwrap(), None);
        assert_eq!(settings.get_or(&LIMIT, 20).await.unwrap(), 20);

        settings.set(&NAME, &"hr".to_string()).await.unwrap();
        settings.set(&LIMIT, &5).await.unwrap();
        settings.set(&OTHER, &true).await.unwrap();
        assert_eq!(settings.get(&NAME).await.unwrap().as_deref(), Some("hr"));
        assert_eq!(settings.get_or(&LIMIT, 20).await.unwrap(), 5);

        let keys: Vec<String> = settings
            .entries("test.")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["test.limit", "test.name"]);

        settings.clear(&NAME).await.unwrap();
        assert_eq!(settings.get(&NAME).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_batch_sets_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let settings = provider(&dir).await;
        settings.set(&LIMIT, &5).await.unwrap();

        let batch = settings
            .batch()
            .set(&NAME, &"hr".to_string())
            .unwrap()
            .clear(&LIMIT);
        assert!(!batch.is_empty());
        batch.commit().await.unwrap();
        assert_eq!(settings.get(&NAME).await.unwrap().as_deref(), Some("hr"));
        assert_eq!(settings.get(&LIMIT).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_updated_at_tracks_writes() {
        let dir = tempfile::tempdir().unwrap();
        let settings = provider(&dir).await;
        assert_eq!(settings.updated_at(&LIMIT).await.unwrap(), None);

        let before = Utc::now() - chrono::Duration::seconds(1);
        settings.set(&LIMIT, &1).await.unwrap();
        let first = settings.updated_at(&LIMIT).await.unwrap().unwrap();
        assert!(first >= before);

        let entries = settings.entries("test.").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, first);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        provider(&dir).await.set(&LIMIT, &42).await.unwrap();

        let reopened = provider(&dir).await;
        assert_eq!(reopened.get(&LIMIT).await.unwrap(), Some(42));
    }
}
