//! API error types

use super::PersistError;

/// Errors that can occur during calls to the REST backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the backend.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse the response.
    #[error("Response parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 4xx responses, which may carry field errors.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if (400..500).contains(status))
    }
}

impl From<ApiError> for PersistError {
    fn from(err: ApiError) -> Self {
        if err.is_client_error()
            && let ApiError::Http { body, .. } = &err
            && !body.is_empty()
        {
            return PersistError::from_message(body);
        }
        PersistError::Generic(err.to_string())
    }
}
