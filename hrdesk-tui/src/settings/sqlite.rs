//! SQLite settings storage.

use std::path::Path;

use async_sqlite::Client;
use async_sqlite::ClientBuilder;
use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use log::debug;

use super::Change;
use super::SettingsBackend;
use super::SettingsError;
use super::StoredValue;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at INTEGER NOT NULL
)";

/// Settings table in a SQLite file, read through a DashMap cache.
///
/// `updated_at` holds Unix milliseconds.
pub struct SqliteBackend {
    client: Client,
    cache: DashMap<String, StoredValue>,
}

impl SqliteBackend {
    /// Open or create the database at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let client = ClientBuilder::new().path(path).open().await?;
        client.conn(|conn| conn.execute(SCHEMA, [])).await?;
        debug!("Opened settings database at {}", path.display());

        Ok(Self {
            client,
            cache: DashMap::new(),
        })
    }
}

fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn fetch(&self, key: &str) -> Result<Option<StoredValue>, SettingsError> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.clone()));
        }

        let owned = key.to_string();
        let row = self
            .client
            .conn(move |conn| {
                let mut stmt =
                    conn.prepare("SELECT value, updated_at FROM settings WHERE key = ?1")?;
                let mut rows = stmt.query([&owned])?;
                rows.next()?
                    .map(|row| -> rusqlite::Result<(Vec<u8>, i64)> {
                        Ok((row.get(0)?, row.get(1)?))
                    })
                    .transpose()
            })
            .await?;

        let value = row.map(|(bytes, millis)| StoredValue {
            bytes,
            updated_at: from_millis(millis),
        });
        if let Some(stored) = &value {
            self.cache.insert(key.to_string(), stored.clone());
        }
        Ok(value)
    }

    async fn apply(&self, changes: Vec<Change>) -> Result<(), SettingsError> {
        if changes.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let millis = now.timestamp_millis();
        let batch = changes.clone();

        self.client
            .conn_mut(move |conn| {
                let tx = conn.transaction()?;
                for change in &batch {
                    match change {
                        Change::Put { key, bytes } => {
                            tx.execute(
                                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                                rusqlite::params![key, bytes, millis],
                            )?;
                        }
                        Change::Remove { key } => {
                            tx.execute("DELETE FROM settings WHERE key = ?1", [key])?;
                        }
                    }
                }
                tx.commit()
            })
            .await?;

        // Only touch the cache once the transaction committed.
        for change in changes {
            match change {
                Change::Put { key, bytes } => {
                    self.cache.insert(
                        key.to_string(),
                        StoredValue {
                            bytes,
                            updated_at: from_millis(millis),
                        },
                    );
                }
                Change::Remove { key } => {
                    self.cache.remove(key);
                }
            }
        }
        debug!("Committed settings batch at {}", now.to_rfc3339());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<(String, DateTime<Utc>)>, SettingsError> {
        let pattern = format!("{}%", prefix);
        let rows = self
            .client
            .conn(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT key, updated_at FROM settings WHERE key LIKE ?1 ORDER BY key",
                )?;
                let rows = stmt.query_map([&pattern], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
                })?;
                rows.collect::<Result<Vec<_>, _>>()
            })
            .await?;
        Ok(rows
            .into_iter()
            .map(|(key, millis)| (key, from_millis(millis)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_batch_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SqliteBackend::open(dir.path().join("settings.db"))
            .await
            .unwrap();
        backend
            .client
            .conn(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER reject_bad BEFORE INSERT ON settings
                     WHEN NEW.key = 'api.bad'
                     BEGIN SELECT RAISE(ABORT, 'rejected'); END",
                )
            })
            .await
            .unwrap();

        let result = backend
            .apply(vec![
                Change::Put {
                    key: "api.url",
                    bytes: vec![1],
                },
                Change::Put {
                    key: "api.bad",
                    bytes: vec![2],
                },
            ])
            .await;
        assert!(result.is_err());
        assert_eq!(backend.fetch("api.url").await.unwrap(), None);
        assert!(backend.list("api.").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let backend = SqliteBackend::open(dir.path().join("settings.db"))
            .await
            .unwrap();
        backend
            .apply(vec![
                Change::Put {
                    key: "api.url",
                    bytes: vec![1],
                },
                Change::Put {
                    key: "api.token",
                    bytes: vec![2],
                },
                Change::Remove { key: "api.url" },
            ])
            .await
            .unwrap();

        let keys: Vec<String> = backend
            .list("api.")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["api.token"]);
        assert_eq!(backend.fetch("api.url").await.unwrap(), None);
        assert_eq!(
            backend.fetch("api.token").await.unwrap().map(|v| v.bytes),
            Some(vec![2])
        );
    }
}
