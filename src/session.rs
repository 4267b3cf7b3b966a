//! Authenticated access to the Google API services.

use std::fmt;
use std::str::FromStr;

use reqwest::Client;

use crate::error::{IngestError, Result};
use crate::service_account::ServiceAccountAuthenticator;

/// The Google API services this crate talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiService {
    Drive,
    Sheets,
}

impl ApiService {
    pub const ALL: [ApiService; 2] = [ApiService::Drive, ApiService::Sheets];

    pub fn name(self) -> &'static str {
        match self {
            ApiService::Drive => "drive",
            ApiService::Sheets => "sheets",
        }
    }

    /// Production base URL, without a trailing slash.
    pub fn default_base_url(self) -> &'static str {
        match self {
            ApiService::Drive => "https://www.googleapis.com/drive/v3",
            ApiService::Sheets => "https://sheets.googleapis.com/v4",
        }
    }
}

impl fmt::Display for ApiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApiService {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        let name = name.strip_suffix("service").unwrap_or(&name);
        ApiService::ALL
            .into_iter()
            .find(|service| service.name() == name)
            .ok_or_else(|| IngestError::UnknownService(s.to_string()))
    }
}

/// Where bearer tokens come from.
#[derive(Clone)]
pub enum TokenSource {
    /// A user access token obtained through the OAuth flow.
    OAuth(String),
    ServiceAccount(ServiceAccountAuthenticator),
}

/// An authenticated Google API client handle.
///
/// Cheap to clone; clones share the HTTP connection pool and the service
/// account token cache.
#[derive(Clone)]
pub struct GoogleApiSession {
    http: Client,
    tokens: TokenSource,
    drive_base_url: String,
    sheets_base_url: String,
}

impl GoogleApiSession {
    pub fn new(http: Client, tokens: TokenSource) -> Self {
        Self {
            http,
            tokens,
            drive_base_url: ApiService::Drive.default_base_url().to_string(),
            sheets_base_url: ApiService::Sheets.default_base_url().to_string(),
        }
    }

    /// A session that always sends the given bearer token.
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self::new(Client::new(), TokenSource::OAuth(access_token.into()))
    }

    /// Point a service at another base URL.
    pub fn with_base_url(mut self, service: ApiService, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        match service {
            ApiService::Drive => self.drive_base_url = base_url,
            ApiService::Sheets => self.sheets_base_url = base_url,
        }
        self
    }

    pub fn base_url(&self, service: ApiService) -> &str {
        match service {
            ApiService::Drive => &self.drive_base_url,
            ApiService::Sheets => &self.sheets_base_url,
        }
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn token_source(&self) -> &TokenSource {
        &self.tokens
    }

    /// Bearer token for the next request.
    pub async fn access_token(&self) -> Result<String> {
        match &self.tokens {
            TokenSource::OAuth(token) => Ok(token.clone()),
            TokenSource::ServiceAccount(auth) => auth.get_access_token().await,
        }
    }
}
