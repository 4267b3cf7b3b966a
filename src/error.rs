//! Error types for the gsheet_ingest crate.

use thiserror::Error;

/// Errors that can occur while authenticating against Google APIs or
/// ingesting spreadsheets from Google Drive.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A credential, token, or project config file is missing, unreadable, or malformed.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Google declined an authentication or token refresh exchange.
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// The auth code callback returned an unusable value.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// The URL names neither a spreadsheet nor a Drive folder, or its ID can't be parsed.
    #[error("Invalid Google Drive URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown Google API service: {0}")]
    UnknownService(String),

    #[error("The Google API client is not authenticated")]
    NotAuthenticated,

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("JWT encoding error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IngestError {
    /// Whether an interactive command should report this error and exit
    /// instead of propagating it.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            IngestError::ConfigError(_)
                | IngestError::AuthenticationError(_)
                | IngestError::ProtocolError(_)
        )
    }
}

/// Result type alias for IngestError.
pub type Result<T> = std::result::Result<T, IngestError>;
