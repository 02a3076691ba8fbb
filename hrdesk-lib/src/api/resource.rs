//! One REST collection as a record store.

use async_trait::async_trait;
use log::debug;
use log::info;
use serde::Deserialize;
use url::Url;

use super::ApiClient;
use crate::error::ApiError;
use crate::error::PersistError;
use crate::model::FieldMap;
use crate::model::Record;
use crate::store::RecordHandler;
use crate::store::RecordStore;

/// Client for a single collection endpoint such as `roles/`.
///
/// | operation | request                 |
/// |-----------|-------------------------|
/// | list      | `GET {base}/{path}/`    |
/// | add       | `POST {base}/{path}/`   |
/// | edit      | `PATCH {base}/{path}/{id}/` |
/// | delete    | `DELETE {base}/{path}/{id}/` |
#[derive(Debug, Clone)]
pub struct ResourceClient {
    client: ApiClient,
    path: String,
}

/// Accepted shapes of a list response.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload {
    Plain(Vec<Record>),
    Data { data: Vec<Record> },
    Results { results: Vec<Record> },
}

impl ResourceClient {
    pub(crate) fn new(client: ApiClient, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into().trim_matches('/').to_string(),
        }
    }

    /// The collection path without slashes.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// URL of the collection.
    pub fn collection_url(&self) -> Result<Url, ApiError> {
        self.client.join(&format!("{}/", self.path))
    }

    /// URL of one record.
    pub fn item_url(&self, id: i64) -> Result<Url, ApiError> {
        self.client.join(&format!("{}/{}/", self.path, id))
    }

    /// Fetches the collection.
    pub async fn fetch(&self) -> Result<Vec<Record>, ApiError> {
        let url = self.collection_url()?;
        debug!("GET {}", url);
        let response = self.client.send(self.client.http().get(url)).await?;
        let body = response.text().await?;
        parse_records(&body)
    }

    /// Creates a record.
    pub async fn create(&self, data: &FieldMap) -> Result<(), ApiError> {
        let url = self.collection_url()?;
        debug!("POST {}", url);
        self.client
            .send(self.client.http().post(url).json(data))
            .await?;
        Ok(())
    }

    /// Patches a record.
    pub async fn update(&self, id: i64, data: &FieldMap) -> Result<(), ApiError> {
        let url = self.item_url(id)?;
        debug!("PATCH {}", url);
        self.client
            .send(self.client.http().patch(url).json(data))
            .await?;
        Ok(())
    }

    /// Deletes a record.
    pub async fn remove(&self, id: i64) -> Result<(), ApiError> {
        let url = self.item_url(id)?;
        debug!("DELETE {}", url);
        self.client.send(self.client.http().delete(url)).await?;
        Ok(())
    }
}

/// Parses a list body: a bare array, `{"data": [...]}` or `{"results": [...]}`.
pub fn parse_records(body: &str) -> Result<Vec<Record>, ApiError> {
    let payload: ListPayload =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(match payload {
        ListPayload::Plain(records) => records,
        ListPayload::Data { data } => data,
        ListPayload::Results { results } => results,
    })
}

#[async_trait]
impl RecordHandler for ResourceClient {
    async fn add(&self, data: FieldMap) -> Result<(), PersistError> {
        self.create(&data).await?;
        info!("Created record in {}", self.path);
        Ok(())
    }

    async fn edit(&self, id: i64, data: FieldMap) -> Result<(), PersistError> {
        self.update(id, &data).await?;
        info!("Updated {} {}", self.path, id);
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), PersistError> {
        self.remove(id).await?;
        info!("Deleted {} {}", self.path, id);
        Ok(())
    }
}

#[async_trait]
impl RecordStore for ResourceClient {
    async fn list(&self) -> Result<Vec<Record>, PersistError> {
        let records = self.fetch().await?;
        debug!("Fetched {} record(s) from {}", records.len(), self.path);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn resource(base: &str, path: &str) -> ResourceClient {
        ApiClient::builder().url(base).build().unwrap().resource(path)
    }

    #[test]
    fn test_urls() {
        let roles = resource("https://hr.example.com/api", "/roles/");
        assert_eq!(roles.path(), "roles");
        assert_eq!(
            roles.collection_url().unwrap().as_str(),
            "https://hr.example.com/api/roles/"
        );
        assert_eq!(
            roles.item_url(7).unwrap().as_str(),
            "https://hr.example.com/api/roles/7/"
        );
    }

    #[test]
    fn test_parse_plain_array() {
        let records =
            parse_records(r#"[{"id": 1, "name": "Admin", "is_active": true}]"#).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), 1);
        assert_eq!(records[0].value("name"), Value::from("Admin"));
        assert_eq!(records[0].is_active(), Some(true));
    }

    #[test]
    fn test_parse_wrapped_arrays() {
        let data = parse_records(r#"{"data": [{"id": 2, "name": "HR"}]}"#).unwrap();
        assert_eq!(data[0].id(), 2);

        let results = parse_records(r#"{"count": 1, "results": [{"id": 3}]}"#).unwrap();
        assert_eq!(results[0].id(), 3);
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(matches!(
            parse_records(r#"{"detail": "Not found."}"#),
            Err(ApiError::Parse(_))
        ));
    }
}
