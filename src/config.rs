//! Project settings file discovery and credential path resolution.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Settings file looked up when no other name is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "scapesettings.yml";

/// Contents of the YAML settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
    #[serde(rename = "gApiAccess", default)]
    pub g_api_access: GApiAccess,
}

/// The `gApiAccess` section of the settings file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GApiAccess {
    #[serde(rename = "gApiOAuthSecretFile", default)]
    pub oauth_secret_file: Option<PathBuf>,
    #[serde(rename = "gApiAccessTokenFile", default)]
    pub access_token_file: Option<PathBuf>,
    #[serde(rename = "gApiServiceAccountCredentialsFile", default)]
    pub service_account_credentials_file: Option<PathBuf>,
}

impl ProjectConfig {
    /// Parse a settings file; relative paths inside it are resolved against
    /// the file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            IngestError::ConfigError(format!("The `{}` file is not readable: {}", path.display(), e))
        })?;

        let mut config: ProjectConfig = if content.trim().is_empty() {
            ProjectConfig::default()
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                IngestError::ConfigError(format!(
                    "The `{}` file is not a valid settings file: {}",
                    path.display(),
                    e
                ))
            })?
        };

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let access = &mut config.g_api_access;
        for file in [
            &mut access.oauth_secret_file,
            &mut access.access_token_file,
            &mut access.service_account_credentials_file,
        ] {
            if let Some(p) = file.take() {
                *file = Some(resolve_path(base, &p));
            }
        }

        Ok(config)
    }
}

/// Search `start_dir` and then its ancestors for `filename`.
///
/// Gives up at the filesystem root, after `max_depth` ancestors when given, or
/// at the first directory whose contents can't be checked.
pub fn find_config_file(start_dir: &Path, filename: &str, max_depth: Option<usize>) -> Option<PathBuf> {
    for (depth, dir) in start_dir.ancestors().enumerate() {
        if max_depth.is_some_and(|max| depth > max) {
            break;
        }

        let candidate = dir.join(filename);
        match candidate.try_exists() {
            Ok(true) => {
                debug!("Found the settings file `{}`", candidate.display());
                return Some(candidate);
            }
            Ok(false) => {}
            Err(e) => {
                debug!("Stopped looking for `{}` at `{}`: {}", filename, dir.display(), e);
                break;
            }
        }
    }
    None
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Credential file paths given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptions {
    pub oauth_secret_file: Option<PathBuf>,
    pub access_token_file: Option<PathBuf>,
    pub service_account_credentials_file: Option<PathBuf>,
}

/// Credential file paths after merging options with the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub oauth_secret_file: Option<PathBuf>,
    pub access_token_file: Option<PathBuf>,
    pub service_account_credentials_file: Option<PathBuf>,
}

impl ConnectionSettings {
    /// Command-line options win over the settings file. Relative option paths
    /// are resolved against `cwd`.
    pub fn resolve(options: &ConnectionOptions, config: Option<&ProjectConfig>, cwd: &Path) -> Self {
        let access = config.map(|c| &c.g_api_access);
        let pick = |option: &Option<PathBuf>, configured: Option<&PathBuf>| {
            option
                .as_deref()
                .map(|p| resolve_path(cwd, p))
                .or_else(|| configured.cloned())
        };

        Self {
            oauth_secret_file: pick(
                &options.oauth_secret_file,
                access.and_then(|a| a.oauth_secret_file.as_ref()),
            ),
            access_token_file: pick(
                &options.access_token_file,
                access.and_then(|a| a.access_token_file.as_ref()),
            ),
            service_account_credentials_file: pick(
                &options.service_account_credentials_file,
                access.and_then(|a| a.service_account_credentials_file.as_ref()),
            ),
        }
    }
}
