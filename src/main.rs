//! gsheet_ingest CLI - Summarize the Google Sheets behind a Drive URL.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gsheet_ingest::config::DEFAULT_CONFIG_FILENAME;
use gsheet_ingest::{
    find_config_file, select_auth_mode, AuthManager, ConnectionOptions, ConnectionSettings,
    DefaultHandlingPolicy, DomainObjectFactory, DomainObjectProcessor, DriveClient,
    DriveProcessService, ProjectConfig, SheetRecord, SheetsClient, DEFAULT_SCOPES,
};

/// Read the spreadsheets behind a Google Drive URL and print a JSON summary.
#[derive(Parser)]
#[command(name = "gsheet_ingest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// URL of a Google Sheet or a Google Drive folder.
    drive_url: String,

    /// Also scan sub-folders when the URL is a folder.
    #[arg(long, short = 'r')]
    recursive: bool,

    /// Path to the OAuth client secret JSON file.
    #[arg(long)]
    g_api_oauth_secret_file: Option<PathBuf>,

    /// Path to the access token JSON file (created if missing).
    #[arg(long)]
    g_api_access_token_file: Option<PathBuf>,

    /// Path to a service account JSON key file.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    g_api_service_account_credentials_file: Option<PathBuf>,

    /// Ask for a new auth code even if an access token is saved.
    #[arg(long)]
    force_authenticate: bool,

    /// Use the service account key when OAuth credentials are also configured.
    #[arg(long)]
    prefer_service_key: bool,

    /// Name of the settings file, looked up from the current directory upwards.
    #[arg(long, short = 'c', default_value = DEFAULT_CONFIG_FILENAME)]
    config_filename: String,

    /// Heading that must appear in a tab's header row (repeatable).
    #[arg(long = "heading")]
    headings: Vec<String>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

/// What the CLI reports for each tab.
#[derive(Debug, Serialize)]
struct SheetSummary {
    url: String,
    spreadsheet_id: String,
    tab: String,
    headings: Option<Vec<String>>,
    data_rows: usize,
}

struct SummaryFactory {
    policy: DefaultHandlingPolicy,
}

impl DomainObjectFactory for SummaryFactory {
    type Object = SheetSummary;
    type Policy = DefaultHandlingPolicy;

    fn handling_policy(&self) -> &DefaultHandlingPolicy {
        &self.policy
    }

    fn create_domain_object(
        &self,
        record: SheetRecord,
        source_url: &str,
    ) -> gsheet_ingest::Result<SheetSummary> {
        Ok(SheetSummary {
            url: source_url.to_string(),
            headings: record.headings().map(|h| h.to_vec()),
            data_rows: record.data_rows().len(),
            spreadsheet_id: record.spreadsheet_id,
            tab: record.tab_name,
        })
    }
}

/// Prints the summaries as a JSON array.
struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> DomainObjectProcessor<SheetSummary> for JsonReport<W> {
    type Output = usize;

    fn process_domain_objects(&mut self, objects: Vec<SheetSummary>) -> gsheet_ingest::Result<usize> {
        serde_json::to_writer_pretty(&mut self.out, &objects)?;
        writeln!(self.out)?;
        Ok(objects.len())
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("Failed to determine the current directory")?;

    let config = match find_config_file(&cwd, &cli.config_filename, None) {
        Some(path) => {
            info!("Using settings from `{}`", path.display());
            Some(ProjectConfig::load(&path).with_context(|| format!("Failed to load settings from {:?}", path))?)
        }
        None => {
            debug!("No `{}` settings file found", cli.config_filename);
            None
        }
    };

    let options = ConnectionOptions {
        oauth_secret_file: cli.g_api_oauth_secret_file.clone(),
        access_token_file: cli.g_api_access_token_file.clone(),
        service_account_credentials_file: cli.g_api_service_account_credentials_file.clone(),
    };
    let settings = ConnectionSettings::resolve(&options, config.as_ref(), &cwd);
    let mode = select_auth_mode(&settings, cli.prefer_service_key)?;
    info!(?mode, "Selected the Google API authentication mode");

    let mut auth = AuthManager::new();
    let authenticated = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stderr();
        auth.authenticate_with_mode(
            &mode,
            DEFAULT_SCOPES,
            cli.force_authenticate,
            &mut input,
            &mut output,
        )
        .await?
    };
    if !authenticated {
        return Ok(ExitCode::FAILURE);
    }

    let session = auth.session()?;
    let service = DriveProcessService::new(DriveClient::new(session.clone()), SheetsClient::new(session));
    let factory = SummaryFactory {
        policy: DefaultHandlingPolicy::new(cli.headings),
    };
    let mut report = JsonReport { out: io::stdout() };

    let tabs = service
        .process_url(&mut report, &cli.drive_url, cli.recursive, &factory)
        .await
        .with_context(|| format!("Failed to process {}", cli.drive_url))?;
    info!("Processed {} tab(s)", tabs);

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rows: Vec<Vec<&str>>, header_row: Option<usize>) -> SheetRecord {
        SheetRecord {
            spreadsheet_id: "S1".to_string(),
            tab_name: "Products".to_string(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
            header_row,
        }
    }

    #[test]
    fn test_cli_parses_options() {
        let cli = Cli::try_parse_from([
            "gsheet_ingest",
            "https://drive.google.com/drive/folders/ABC",
            "-r",
            "--heading",
            "Name",
            "--heading",
            "Price",
            "-vv",
        ])
        .unwrap();

        assert!(cli.recursive);
        assert_eq!(cli.headings, vec!["Name", "Price"]);
        assert_eq!(cli.config_filename, DEFAULT_CONFIG_FILENAME);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.force_authenticate);
    }

    #[test]
    fn test_cli_requires_url() {
        assert!(Cli::try_parse_from(["gsheet_ingest"]).is_err());
    }

    #[test]
    fn test_summary_factory() {
        let factory = SummaryFactory {
            policy: DefaultHandlingPolicy::new(["Name"]),
        };
        let summary = factory
            .create_domain_object(
                record(vec![vec!["Name"], vec!["Tea"], vec!["Coffee"]], Some(0)),
                "https://docs.google.com/spreadsheets/d/S1/",
            )
            .unwrap();

        assert_eq!(summary.tab, "Products");
        assert_eq!(summary.headings, Some(vec!["Name".to_string()]));
        assert_eq!(summary.data_rows, 2);
    }

    #[test]
    fn test_json_report() {
        let mut report = JsonReport { out: Vec::new() };
        let summary = SheetSummary {
            url: "u".to_string(),
            spreadsheet_id: "S1".to_string(),
            tab: "Products".to_string(),
            headings: None,
            data_rows: 0,
        };

        let count = report.process_domain_objects(vec![summary]).unwrap();

        assert_eq!(count, 1);
        let json: serde_json::Value = serde_json::from_slice(&report.out).unwrap();
        assert_eq!(json[0]["tab"], "Products");
        assert!(json[0]["headings"].is_null());
    }
}
