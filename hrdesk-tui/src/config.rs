//! Startup configuration read from the settings database.

use std::time::Duration;

use hrdesk_lib::api::ApiClient;
use hrdesk_lib::error::ApiError;
use log::{debug, info};

use crate::settings::Setting;
use crate::settings::SettingsError;
use crate::settings::SettingsProvider;

pub const API_URL: Setting<String> = Setting::new("api.url");
pub const API_TOKEN: Setting<String> = Setting::new("api.token");
pub const API_TIMEOUT_SECS: Setting<u64> = Setting::new("api.timeout_secs");
pub const API_CONNECT_TIMEOUT_SECS: Setting<u64> = Setting::new("api.connect_timeout_secs");
pub const PAGE_SIZE: Setting<u32> = Setting::new("table.page_size");

/// Overrides `api.url`; the value is saved for later runs and an empty value
/// switches back to offline mode.
pub const ENV_API_URL: &str = "HRDESK_API_URL";
/// Overrides `api.token`; the value is saved for later runs.
pub const ENV_API_TOKEN: &str = "HRDESK_API_TOKEN";

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Backend base URL; `None` runs offline against sample data.
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub page_size: usize,
}

impl AppConfig {
    /// Load settings, applying and saving environment overrides.
    pub async fn load(settings: &SettingsProvider) -> Result<Self, SettingsError> {
        Self::load_with(settings, |name| std::env::var(name).ok()).await
    }

    async fn load_with(
        settings: &SettingsProvider,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let mut overrides = settings.batch();
        for (var, setting) in [(ENV_API_URL, &API_URL), (ENV_API_TOKEN, &API_TOKEN)] {
            overrides = match env(var) {
                Some(value) if value.trim().is_empty() => {
                    info!("Clearing {} because {} is empty", setting.key(), var);
                    overrides.clear(setting)
                }
                Some(value) => {
                    info!("Using {} from {}", setting.key(), var);
                    overrides.set(setting, &value)?
                }
                None => overrides,
            };
        }
        if !overrides.is_empty() {
            overrides.commit().await?;
        }
        for (key, updated_at) in settings.entries("api.").await? {
            debug!("Setting {} last changed {}", key, updated_at.to_rfc3339());
        }

        let timeout_secs = settings
            .get_or(&API_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)
            .await?;
        let connect_timeout_secs = settings
            .get_or(&API_CONNECT_TIMEOUT_SECS, DEFAULT_CONNECT_TIMEOUT_SECS)
            .await?;
        let page_size = settings.get_or(&PAGE_SIZE, DEFAULT_PAGE_SIZE).await?;

        Ok(Self {
            api_url: non_blank(settings.get(&API_URL).await?),
            api_token: non_blank(settings.get(&API_TOKEN).await?),
            timeout: Duration::from_secs(timeout_secs),
            connect_timeout: Duration::from_secs(connect_timeout_secs),
            page_size: page_size as usize,
        })
    }

    /// Client for the configured backend, `None` in offline mode.
    pub fn api_client(&self) -> Result<Option<ApiClient>, ApiError> {
        let Some(url) = &self.api_url else {
            return Ok(None);
        };
        let mut builder = ApiClient::builder()
            .url(url.clone())
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout);
        if let Some(token) = &self.api_token {
            builder = builder.token(token.clone());
        }
        builder.build().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SqliteBackend;

    async fn settings(dir: &tempfile::TempDir) -> SettingsProvider {
        let backend = SqliteBackend::open(dir.path().join("settings.db"))
            .await
            .unwrap();
        SettingsProvider::new(backend)
    }

    #[tokio::test]
    async fn test_defaults_are_offline() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir).await;

        let config = AppConfig::load_with(&settings, |_| None).await.unwrap();
        assert_eq!(config.api_url, None);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            config.connect_timeout,
            Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS)
        );
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE as usize);
        assert!(config.api_client().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_env_overrides_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir).await;
        settings.set(&API_URL, &"http://old".to_string()).await.unwrap();
        settings.set(&PAGE_SIZE, &25).await.unwrap();
        settings.set(&API_CONNECT_TIMEOUT_SECS, &2).await.unwrap();

        let env = |name: &str| match name {
            ENV_API_URL => Some("http://localhost:8000/api".to_string()),
            ENV_API_TOKEN => Some("  ".to_string()),
            _ => None,
        };
        let config = AppConfig::load_with(&settings, env).await.unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8000/api"));
        assert_eq!(config.api_token, None);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.connect_timeout, Duration::from_secs(2));

        let again = AppConfig::load_with(&settings, |_| None).await.unwrap();
        assert_eq!(again.api_url.as_deref(), Some("http://localhost:8000/api"));

        let client = again.api_client().unwrap().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
    }

    #[tokio::test]
    async fn test_env_overrides_are_saved_together() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir).await;

        let env = |name: &str| match name {
            ENV_API_URL => Some("http://hr.local/api".to_string()),
            ENV_API_TOKEN => Some("secret".to_string()),
            _ => None,
        };
        let config = AppConfig::load_with(&settings, env).await.unwrap();
        assert_eq!(config.api_token.as_deref(), Some("secret"));

        let url_at = settings.updated_at(&API_URL).await.unwrap();
        let token_at = settings.updated_at(&API_TOKEN).await.unwrap();
        assert!(url_at.is_some());
        assert_eq!(url_at, token_at);
    }

    #[tokio::test]
    async fn test_empty_env_clears_url() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir).await;
        settings.set(&API_URL, &"http://old".to_string()).await.unwrap();

        let env = |name: &str| (name == ENV_API_URL).then(String::new);
        let config = AppConfig::load_with(&settings, env).await.unwrap();
        assert_eq!(config.api_url, None);
        assert!(settings.entries("api.").await.unwrap().is_empty());
    }
}
