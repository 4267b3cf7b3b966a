//! gsheet_ingest - Read Google Sheets, or whole Drive folders of them, into
//! application objects.
//!
//! This library provides functionality to:
//! - Authenticate with an OAuth client secret (saving and refreshing the access
//!   token) or a service account key
//! - Classify a Drive URL as a spreadsheet or a folder
//! - Scan folders (optionally recursively) for spreadsheets, skipping private
//!   `name_` files and tabs
//! - Build domain objects from each tab through a caller-supplied factory
//!
//! # Example
//!
//! ```no_run
//! use gsheet_ingest::{
//!     AuthManager, DefaultHandlingPolicy, DomainObjectFactory, DomainObjectProcessor,
//!     DriveClient, DriveProcessService, SheetRecord, SheetsClient, DEFAULT_SCOPES,
//! };
//! use std::path::Path;
//!
//! struct TabNames(DefaultHandlingPolicy);
//!
//! impl DomainObjectFactory for TabNames {
//!     type Object = String;
//!     type Policy = DefaultHandlingPolicy;
//!
//!     fn handling_policy(&self) -> &DefaultHandlingPolicy {
//!         &self.0
//!     }
//!
//!     fn create_domain_object(&self, record: SheetRecord, _url: &str) -> gsheet_ingest::Result<String> {
//!         Ok(record.tab_name)
//!     }
//! }
//!
//! struct Print;
//!
//! impl DomainObjectProcessor<String> for Print {
//!     type Output = usize;
//!
//!     fn process_domain_objects(&mut self, objects: Vec<String>) -> gsheet_ingest::Result<usize> {
//!         objects.iter().for_each(|name| println!("{}", name));
//!         Ok(objects.len())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut auth = AuthManager::new();
//!     auth.authenticate_service_account(Path::new("service-account.json"), DEFAULT_SCOPES)?;
//!     let session = auth.session()?;
//!
//!     let service = DriveProcessService::new(
//!         DriveClient::new(session.clone()),
//!         SheetsClient::new(session),
//!     );
//!     let factory = TabNames(DefaultHandlingPolicy::new(["Name"]));
//!     let count = service
//!         .process_url(&mut Print, "https://drive.google.com/drive/folders/abc", true, &factory)
//!         .await?;
//!     println!("{} tabs", count);
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod policy;
pub mod reader;
pub mod service_account;
pub mod session;
pub mod traverser;
pub mod url_parser;

// Re-exports for convenience
pub use auth::{select_auth_mode, AuthManager, AuthMode, DEFAULT_SCOPES};
pub use client::{DriveClient, SheetsClient};
pub use config::{find_config_file, ConnectionOptions, ConnectionSettings, ProjectConfig};
pub use error::{IngestError, Result};
pub use pipeline::{DomainObjectFactory, DomainObjectProcessor, DriveProcessService};
pub use policy::{DefaultHandlingPolicy, HandlingPolicy};
pub use reader::{SheetRecord, SpreadsheetSource};
pub use session::{ApiService, GoogleApiSession};
pub use traverser::FolderListing;
pub use url_parser::{classify, ResourceKind, ResourceReference};
