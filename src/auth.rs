//! OAuth2 authentication and access token lifecycle.
//!
//! [`AuthManager`] authenticates either with an OAuth client secret (reusing a
//! saved access token when possible, otherwise asking the user for an auth
//! code) or with a service account key, and hands out a
//! [`GoogleApiSession`] for the rest of the run.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use reqwest::{Client, Url};
use serde_json::Value;
use tracing::info;

use crate::config::ConnectionSettings;
use crate::credentials::{load_credential_json, save_credential_json};
use crate::error::{IngestError, Result};
use crate::models::{AccessToken, ClientSecret, ClientSecretFile};
use crate::service_account::ServiceAccountAuthenticator;
use crate::session::{GoogleApiSession, TokenSource};

/// Read-only access to Drive file listings.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Read-only access to spreadsheet contents.
pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

/// Scopes needed to scan folders and read spreadsheets.
pub const DEFAULT_SCOPES: &[&str] = &[DRIVE_READONLY_SCOPE, SPREADSHEETS_READONLY_SCOPE];

/// Out-of-band redirect: Google shows the auth code to the user.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// How to authenticate, decided from the configured credential files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    ServiceAccount {
        credentials_file: PathBuf,
    },
    OAuth {
        secret_file: PathBuf,
        token_file: Option<PathBuf>,
    },
}

/// Choose between service account and OAuth authentication.
///
/// The service account key wins when `prefer_service_key` is set or when it is
/// the only credential configured. OAuth needs both the client secret and the
/// access token file paths.
pub fn select_auth_mode(settings: &ConnectionSettings, prefer_service_key: bool) -> Result<AuthMode> {
    let service_key = settings.service_account_credentials_file.as_ref();
    let oauth = match (&settings.oauth_secret_file, &settings.access_token_file) {
        (Some(secret), Some(token)) => Some((secret, token)),
        _ => None,
    };

    match (service_key, oauth) {
        (Some(key), _) if prefer_service_key => Ok(AuthMode::ServiceAccount {
            credentials_file: key.clone(),
        }),
        (_, Some((secret, token))) => Ok(AuthMode::OAuth {
            secret_file: secret.clone(),
            token_file: Some(token.clone()),
        }),
        (Some(key), None) => Ok(AuthMode::ServiceAccount {
            credentials_file: key.clone(),
        }),
        (None, None) => Err(IngestError::ConfigError(
            "Neither a service account key nor OAuth credentials were found in the command options or settings"
                .to_string(),
        )),
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Owns the Google API client handle and establishes its credentials.
pub struct AuthManager {
    http: Client,
    token: Option<TokenSource>,
}

impl Default for AuthManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthManager {
    pub fn new() -> Self {
        Self::with_http_client(Client::new())
    }

    pub fn with_http_client(http: Client) -> Self {
        Self { http, token: None }
    }

    /// Authenticate with an OAuth client secret.
    ///
    /// A saved token at `token_path` is reused unless `force_authenticate` is
    /// set. Otherwise `auth_code_prompt` is called with the consent URL and must
    /// return the auth code the user got from Google; the resulting token is
    /// saved to `token_path`. An expired token is refreshed once and saved
    /// again.
    pub async fn authenticate<F>(
        &mut self,
        secret_path: &Path,
        token_path: Option<&Path>,
        scopes: &[&str],
        auth_code_prompt: F,
        force_authenticate: bool,
    ) -> Result<()>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        info!(
            "Getting the Google API client secret from the `{}` file",
            secret_path.display()
        );
        let secret = load_client_secret(secret_path)?;

        let saved_token = match token_path {
            Some(path) if !force_authenticate && path.is_file() => Some(path),
            _ => None,
        };

        let mut token = match saved_token {
            Some(path) => {
                info!(
                    "Getting the last Google API access token from the `{}` file",
                    path.display()
                );
                let value = load_credential_json(path)?;
                serde_json::from_value::<AccessToken>(value).map_err(|e| {
                    IngestError::ConfigError(format!(
                        "The `{}` file is not a valid access token: {}",
                        path.display(),
                        e
                    ))
                })?
            }
            None => {
                let auth_url = authorization_url(&secret, scopes)?;
                let auth_code = auth_code_prompt(auth_url.as_str())?;
                if auth_code.trim().is_empty() {
                    return Err(IngestError::ProtocolError(
                        "The auth code prompt has returned an empty string".to_string(),
                    ));
                }

                info!("Sending the authentication code to Google");
                let token = self.exchange_auth_code(&secret, auth_code.trim()).await?;
                info!("Authenticated successfully");

                if let Some(path) = token_path {
                    info!(
                        "Saving the access token to the `{}` file, so subsequent executions will not prompt for authorization",
                        path.display()
                    );
                    save_credential_json(path, &token)?;
                }
                token
            }
        };

        if token.is_expired_at(now_secs()) {
            info!("The access token is expired; refreshing the token");
            token = self.refresh_token(&secret, &token).await?;

            if let Some(path) = token_path {
                info!(
                    "Saving the refreshed access token to the `{}` file",
                    path.display()
                );
                save_credential_json(path, &token)?;
            }
        }

        self.token = Some(TokenSource::OAuth(token.access_token));
        info!("The Google authentication is completed");
        Ok(())
    }

    /// [`authenticate`](Self::authenticate) for console use.
    ///
    /// Prints the consent URL to `output`, reads the auth code from `input`,
    /// and reports configuration and authentication failures to `output`
    /// instead of returning them. Returns whether authentication succeeded.
    pub async fn authenticate_interactive<R, W>(
        &mut self,
        secret_path: &Path,
        token_path: Option<&Path>,
        scopes: &[&str],
        force_authenticate: bool,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool>
    where
        R: BufRead,
        W: Write,
    {
        let result = {
            let prompt = |auth_url: &str| console_auth_code_prompt(auth_url, &mut *input, &mut *output);
            self.authenticate(secret_path, token_path, scopes, prompt, force_authenticate)
                .await
        };

        match result {
            Ok(()) => Ok(true),
            Err(e) if e.is_auth_failure() => {
                report_auth_failure(output, &e)?;
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Authenticate with a service account key, bypassing the token file.
    pub fn authenticate_service_account(&mut self, credentials_path: &Path, scopes: &[&str]) -> Result<()> {
        let auth = ServiceAccountAuthenticator::from_file(credentials_path, scopes)?;
        info!(client_email = %auth.client_email(), "Using the Google service account key");
        self.token = Some(TokenSource::ServiceAccount(auth));
        Ok(())
    }

    /// Authenticate according to `mode`, prompting on the console if needed.
    pub async fn authenticate_with_mode<R, W>(
        &mut self,
        mode: &AuthMode,
        scopes: &[&str],
        force_authenticate: bool,
        input: &mut R,
        output: &mut W,
    ) -> Result<bool>
    where
        R: BufRead,
        W: Write,
    {
        match mode {
            AuthMode::ServiceAccount { credentials_file } => {
                match self.authenticate_service_account(credentials_file, scopes) {
                    Ok(()) => Ok(true),
                    Err(e) if e.is_auth_failure() => {
                        report_auth_failure(output, &e)?;
                        Ok(false)
                    }
                    Err(e) => Err(e),
                }
            }
            AuthMode::OAuth {
                secret_file,
                token_file,
            } => {
                self.authenticate_interactive(
                    secret_file,
                    token_file.as_deref(),
                    scopes,
                    force_authenticate,
                    input,
                    output,
                )
                .await
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The authenticated client handle.
    pub fn session(&self) -> Result<GoogleApiSession> {
        let tokens = self.token.clone().ok_or(IngestError::NotAuthenticated)?;
        Ok(GoogleApiSession::new(self.http.clone(), tokens))
    }

    async fn exchange_auth_code(&self, secret: &ClientSecret, code: &str) -> Result<AccessToken> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("redirect_uri", OOB_REDIRECT_URI),
        ];
        let value = self.post_token_request(&secret.token_uri, &params).await?;
        parse_token_response(value, "Google has declined the auth code")
    }

    async fn refresh_token(&self, secret: &ClientSecret, token: &AccessToken) -> Result<AccessToken> {
        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            IngestError::AuthenticationError(
                "The access token is expired and has no refresh token".to_string(),
            )
        })?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
        ];
        let value = self.post_token_request(&secret.token_uri, &params).await?;
        let mut refreshed = parse_token_response(value, "Google has declined refreshing the token")?;
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = Some(refresh_token.to_string());
        }
        Ok(refreshed)
    }

    /// POST a token request and return the JSON body, whatever the status.
    async fn post_token_request(&self, token_uri: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self.http.post(token_uri).form(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|_| IngestError::ApiError {
            status: status.as_u16(),
            message: body,
        })
    }
}

/// Print an authentication failure as a console error block.
fn report_auth_failure<W: Write>(output: &mut W, error: &IngestError) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "  [ERROR] {}", error)?;
    writeln!(output)?;
    Ok(())
}

fn load_client_secret(path: &Path) -> Result<ClientSecret> {
    let value = load_credential_json(path)?;
    serde_json::from_value::<ClientSecretFile>(value)
        .ok()
        .and_then(ClientSecretFile::into_secret)
        .ok_or_else(|| {
            IngestError::ConfigError(format!(
                "The `{}` file is not an OAuth client secret (expected an `installed` or `web` client)",
                path.display()
            ))
        })
}

/// The consent page URL the user has to open to get an auth code.
pub fn authorization_url(secret: &ClientSecret, scopes: &[&str]) -> Result<Url> {
    let scope = scopes.join(" ");
    Url::parse_with_params(
        &secret.auth_uri,
        &[
            ("response_type", "code"),
            ("access_type", "offline"),
            ("client_id", secret.client_id.as_str()),
            ("redirect_uri", OOB_REDIRECT_URI),
            ("scope", scope.as_str()),
        ],
    )
    .map_err(|e| IngestError::ConfigError(format!("Invalid auth URI `{}`: {}", secret.auth_uri, e)))
}

/// Turn a token endpoint response into a token, rejecting error responses.
fn parse_token_response(value: Value, declined: &str) -> Result<AccessToken> {
    if let Some(error) = value.get("error") {
        let reason = value
            .get("error_description")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        return Err(IngestError::AuthenticationError(format!("{}: {}", declined, reason)));
    }

    let mut token: AccessToken = serde_json::from_value(value).map_err(|e| {
        IngestError::AuthenticationError(format!("Unexpected token response from Google: {}", e))
    })?;
    if token.created.is_none() {
        token.created = Some(now_secs());
    }
    Ok(token)
}

/// Ask for an auth code on the console.
///
/// Prints the consent URL, reads one line, and rejects an empty answer with
/// [`IngestError::ProtocolError`].
pub fn console_auth_code_prompt<R, W>(auth_url: &str, input: &mut R, output: &mut W) -> Result<String>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Open the following link in your browser:")?;
    writeln!(output, "{}", auth_url)?;
    write!(output, "Enter verification code: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let code = line.trim();
    if code.is_empty() {
        return Err(IngestError::ProtocolError(
            "No verification code was entered".to_string(),
        ));
    }
    Ok(code.to_string())
}
