//! Classifying Google Drive URLs and extracting their IDs.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::error::{IngestError, Result};

static SPREADSHEET_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/spreadsheets/d/([a-zA-Z0-9_-]+)").expect("Invalid spreadsheet URL regex")
});

static FOLDER_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/folders/([a-zA-Z0-9_-]+)/?").expect("Invalid folder URL regex")
});

/// What a Drive URL points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Spreadsheet,
    Folder,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Spreadsheet => write!(f, "spreadsheet"),
            ResourceKind::Folder => write!(f, "folder"),
        }
    }
}

/// A classified Drive URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    kind: ResourceKind,
    id: String,
    url: String,
}

impl ResourceReference {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The URL the reference was parsed from.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Whether the URL contains a `/spreadsheets/` path segment.
pub fn is_spreadsheet(url: &str) -> bool {
    url.contains("/spreadsheets/")
}

/// Whether the URL contains a `/folders/` path segment.
pub fn is_folder(url: &str) -> bool {
    url.contains("/folders/")
}

/// Extract the spreadsheet ID from a `.../spreadsheets/d/<ID>/...` URL.
pub fn parse_spreadsheet_id(url: &str) -> Option<String> {
    SPREADSHEET_ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

/// Extract the folder ID from a `.../folders/<ID>` URL.
pub fn parse_folder_id(url: &str) -> Option<String> {
    FOLDER_ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

/// Classify a URL as a spreadsheet or a folder and extract its ID.
///
/// The spreadsheet check runs first, so a URL that matches both patterns is a
/// spreadsheet.
///
/// # Examples
///
/// ```
/// use gsheet_ingest::url_parser::{classify, ResourceKind};
///
/// let reference = classify("https://drive.google.com/drive/folders/ABC123").unwrap();
/// assert_eq!(reference.kind(), ResourceKind::Folder);
/// assert_eq!(reference.id(), "ABC123");
/// ```
pub fn classify(url: &str) -> Result<ResourceReference> {
    let url = url.trim();

    let (kind, id) = if is_spreadsheet(url) {
        let id = parse_spreadsheet_id(url).ok_or_else(|| {
            IngestError::InvalidUrl(format!("Can't parse spreadsheet ID from the URL [{}]", url))
        })?;
        (ResourceKind::Spreadsheet, id)
    } else if is_folder(url) {
        let id = parse_folder_id(url).ok_or_else(|| {
            IngestError::InvalidUrl(format!("Can't parse folder ID from the URL [{}]", url))
        })?;
        (ResourceKind::Folder, id)
    } else {
        return Err(IngestError::InvalidUrl(format!(
            "URL is neither a Google Spreadsheet nor a Google Drive folder [{}]",
            url
        )));
    };

    Ok(ResourceReference {
        kind,
        id,
        url: url.to_string(),
    })
}

/// Canonical URL of a spreadsheet found while scanning a folder.
pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/", spreadsheet_id)
}
