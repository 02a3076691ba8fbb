use hrdesk_lib::error::ApiError;
use hrdesk_lib::error::SchemaError;
use thiserror::Error;

use crate::settings::SettingsError;

/// Errors that stop the application from starting or keep running.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no data directory available on this platform")]
    NoDataDir,
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("invalid API configuration: {0}")]
    Api(#[from] ApiError),
    #[error("invalid screen definition: {0}")]
    Schema(#[from] SchemaError),
    #[error("failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
