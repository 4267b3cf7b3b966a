//! Data models for Google API payloads and credential files.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mime type for a Google Drive folder.
pub const MIME_TYPE_DRIVE_FOLDER: &str = "application/vnd.google-apps.folder";

/// Mime type for a Google Sheets document.
pub const MIME_TYPE_GOOGLE_SPREADSHEET: &str = "application/vnd.google-apps.spreadsheet";

/// Metadata for a file or folder in Google Drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl FileMetadata {
    pub fn is_folder(&self) -> bool {
        self.mime_type.as_deref() == Some(MIME_TYPE_DRIVE_FOLDER)
    }

    pub fn is_spreadsheet(&self) -> bool {
        self.mime_type.as_deref() == Some(MIME_TYPE_GOOGLE_SPREADSHEET)
    }
}

/// Response from the files.list API endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListResponse {
    #[serde(default)]
    pub files: Vec<FileMetadata>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Spreadsheet metadata, restricted to the tab titles.
#[derive(Debug, Deserialize)]
pub struct SpreadsheetResponse {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
pub struct SheetProperties {
    pub title: String,
}

/// Response from the spreadsheets.values.get API endpoint.
#[derive(Debug, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Cell grid as strings; non-string cells keep their JSON rendering.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| match cell {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .collect()
    }
}

/// Google API error response.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub code: u16,
    pub message: String,
}

/// Service account credentials from JSON file.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountCredentials {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// OAuth2 token response for the JWT bearer grant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// OAuth client secret file as downloaded from the Google Cloud console.
#[derive(Debug, Deserialize)]
pub struct ClientSecretFile {
    pub installed: Option<ClientSecret>,
    pub web: Option<ClientSecret>,
}

impl ClientSecretFile {
    pub fn into_secret(self) -> Option<ClientSecret> {
        self.installed.or(self.web)
    }
}

/// OAuth client identity.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

pub(crate) fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// An OAuth access token as stored in the access token file.
///
/// Fields Google sends that are not modelled here survive a load/save cycle
/// through `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Unix time the token was issued at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Seconds before the nominal expiry at which a token is treated as expired.
const EXPIRY_LEEWAY_SECS: u64 = 30;

impl AccessToken {
    /// Whether the token is expired at unix time `now`.
    ///
    /// A token without `created` or `expires_in` is considered expired.
    pub fn is_expired_at(&self, now: u64) -> bool {
        let created = self.created.unwrap_or(0);
        let lifetime = self.expires_in.unwrap_or(0);
        created.saturating_add(lifetime).saturating_sub(EXPIRY_LEEWAY_SECS) < now
    }
}
