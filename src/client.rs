//! Google Drive and Google Sheets API clients.

use async_trait::async_trait;
use reqwest::{Response, Url};

use crate::error::{IngestError, Result};
use crate::models::{
    ApiErrorResponse, FileListResponse, FileMetadata, SpreadsheetResponse, ValueRange,
};
use crate::reader::SpreadsheetSource;
use crate::session::{ApiService, GoogleApiSession};
use crate::traverser::FolderListing;

/// Turn a non-2xx response into an [`IngestError::ApiError`], preferring the
/// message from Google's error envelope.
async fn api_error(response: Response) -> IngestError {
    let status = response.status();
    let error_body = response.text().await.unwrap_or_default();
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
        return IngestError::ApiError {
            status: api_error.error.code,
            message: api_error.error.message,
        };
    }
    IngestError::ApiError {
        status: status.as_u16(),
        message: error_body,
    }
}

/// Client for listing Google Drive folders.
#[derive(Clone)]
pub struct DriveClient {
    session: GoogleApiSession,
}

impl DriveClient {
    pub fn new(session: GoogleApiSession) -> Self {
        Self { session }
    }

    /// List all files and folders directly inside a folder.
    ///
    /// # Arguments
    /// * `parent_id` - The ID of the parent folder
    pub async fn list_files(&self, parent_id: &str) -> Result<Vec<FileMetadata>> {
        let query = format!(
            "'{}' in parents and trashed = false",
            parent_id.replace('\'', "\\'")
        );
        self.query_files(&query).await
    }

    /// Query files using Google Drive query syntax.
    pub async fn query_files(&self, query: &str) -> Result<Vec<FileMetadata>> {
        let token = self.session.access_token().await?;
        let base = self.session.base_url(ApiService::Drive);
        let mut all_files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .session
                .http()
                .get(format!("{}/files", base))
                .bearer_auth(&token)
                .query(&[
                    ("q", query),
                    ("includeItemsFromAllDrives", "true"),
                    ("supportsAllDrives", "true"),
                    ("spaces", "drive"),
                    ("fields", "nextPageToken, files(id, name, mimeType)"),
                ]);

            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                return Err(api_error(response).await);
            }

            let list_response: FileListResponse = response.json().await?;
            all_files.extend(list_response.files);

            match list_response.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(all_files)
    }
}

#[async_trait]
impl FolderListing for DriveClient {
    async fn list_folder(&self, folder_id: &str) -> Result<Vec<FileMetadata>> {
        self.list_files(folder_id).await
    }
}

/// Client for reading Google Sheets documents.
#[derive(Clone)]
pub struct SheetsClient {
    session: GoogleApiSession,
}

impl SheetsClient {
    pub fn new(session: GoogleApiSession) -> Self {
        Self { session }
    }

    fn spreadsheet_url(&self, spreadsheet_id: &str, extra_segments: &[&str]) -> Result<Url> {
        let base = self.session.base_url(ApiService::Sheets);
        let mut url = Url::parse(&format!("{}/", base)).map_err(|e| {
            IngestError::ConfigError(format!("Invalid Sheets API base URL `{}`: {}", base, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                IngestError::ConfigError(format!("Invalid Sheets API base URL `{}`", base))
            })?
            .pop_if_empty()
            .push("spreadsheets")
            .push(spreadsheet_id)
            .extend(extra_segments);
        Ok(url)
    }

    /// Titles of all tabs in a spreadsheet, in display order.
    pub async fn tab_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        let token = self.session.access_token().await?;
        let url = self.spreadsheet_url(spreadsheet_id, &[])?;

        let response = self
            .session
            .http()
            .get(url)
            .bearer_auth(&token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let spreadsheet: SpreadsheetResponse = response.json().await?;
        Ok(spreadsheet
            .sheets
            .into_iter()
            .map(|sheet| sheet.properties.title)
            .collect())
    }

    /// Cell values of an A1-notation range, row by row.
    pub async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        let token = self.session.access_token().await?;
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;

        let response = self
            .session
            .http()
            .get(url)
            .bearer_auth(&token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let values: ValueRange = response.json().await?;
        Ok(values.into_rows())
    }
}

#[async_trait]
impl SpreadsheetSource for SheetsClient {
    async fn tab_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        SheetsClient::tab_titles(self, spreadsheet_id).await
    }

    async fn read_range(&self, spreadsheet_id: &str, range: &str) -> Result<Vec<Vec<String>>> {
        SheetsClient::read_range(self, spreadsheet_id, range).await
    }
}
