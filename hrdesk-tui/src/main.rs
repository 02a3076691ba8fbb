mod app;
mod config;
mod error;
mod paths;
mod render;
mod screens;
mod settings;
mod terminal;

use std::fs::{self, File};
use std::sync::Arc;

use hrdesk_lib::ManagementTable;
use hrdesk_lib::api::ApiClient;
use hrdesk_lib::store::{MemoryStore, RecordStore};
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::app::{App, Screen};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::settings::{SettingsProvider, SqliteBackend};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    init_logging()?;

    let db = paths::settings_db().ok_or(AppError::NoDataDir)?;
    if let Some(dir) = db.parent() {
        fs::create_dir_all(dir)?;
    }
    let settings = SettingsProvider::new(SqliteBackend::open(&db).await?);
    let config = AppConfig::load(&settings).await?;

    let client = config.api_client()?;
    let source = match &client {
        Some(client) => client.base_url().to_string(),
        None => "offline sample data".to_string(),
    };
    let screens = build_screens(client.as_ref(), config.page_size)?;

    App::new(screens, source).run().await
}

fn init_logging() -> Result<(), AppError> {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    WriteLogger::init(LevelFilter::Debug, Config::default(), File::create(&path)?)?;
    info!("Logging to {}", path.display());
    Ok(())
}

/// One screen per admin resource, backed by the API or by seeded memory stores.
fn build_screens(client: Option<&ApiClient>, page_size: usize) -> Result<Vec<Screen>, AppError> {
    screens::screens()
        .into_iter()
        .map(|spec| {
            let table = ManagementTable::new(spec.entity, spec.fields)?
                .with_page_size(page_size)
                .with_empty_text(format!("No {} found.", spec.title.to_lowercase()));
            let store: Arc<dyn RecordStore> = match client {
                Some(client) => Arc::new(client.resource(spec.path)),
                None => Arc::new(
                    MemoryStore::new(spec.entity)
                        .unique("name")
                        .with_records(spec.seed),
                ),
            };
            Ok(Screen::new(spec.title, table, store))
        })
        .collect()
}
