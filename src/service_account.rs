//! Service account authentication for Google APIs.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::credentials::load_credential;
use crate::error::{IngestError, Result};
use crate::models::{default_token_uri, ServiceAccountCredentials, TokenResponse};

/// JWT claims for service account authentication.
#[derive(Debug, Serialize)]
struct Claims {
    iss: String,   // Issuer (service account email)
    scope: String, // Space separated OAuth scopes
    aud: String,   // Audience (token endpoint)
    exp: u64,      // Expiration time
    iat: u64,      // Issued at
}

/// Cached access token with expiration.
#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: SystemTime,
}

/// Authenticator for Google APIs using service account credentials.
#[derive(Clone)]
pub struct ServiceAccountAuthenticator {
    credentials: Arc<ServiceAccountCredentials>,
    scopes: Arc<Vec<String>>,
    client: Client,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
}

impl ServiceAccountAuthenticator {
    /// Create a new authenticator from a service account JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P, scopes: &[&str]) -> Result<Self> {
        let path = path.as_ref();
        info!(
            "Getting the Google API service account key from the `{}` file",
            path.display()
        );
        let credentials: ServiceAccountCredentials = load_credential(path)?;
        Ok(Self::new(credentials, scopes, Client::new()))
    }

    /// Create a new authenticator from credentials.
    pub fn new(credentials: ServiceAccountCredentials, scopes: &[&str], client: Client) -> Self {
        Self {
            credentials: Arc::new(credentials),
            scopes: Arc::new(scopes.iter().map(|s| s.to_string()).collect()),
            client,
            cached_token: Arc::new(RwLock::new(None)),
        }
    }

    /// The service account e-mail address.
    pub fn client_email(&self) -> &str {
        &self.credentials.client_email
    }

    /// Get a valid access token, refreshing if necessary.
    pub async fn get_access_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                // 60 second buffer before expiration
                let buffer = Duration::from_secs(60);
                if token.expires_at > SystemTime::now() + buffer {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let new_token = self.fetch_token().await?;

        {
            let mut cached = self.cached_token.write().await;
            *cached = Some(new_token.clone());
        }

        Ok(new_token.access_token)
    }

    fn token_uri(&self) -> String {
        self.credentials
            .token_uri
            .clone()
            .unwrap_or_else(default_token_uri)
    }

    fn claims(&self, now: u64) -> Claims {
        Claims {
            iss: self.credentials.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.token_uri(),
            iat: now,
            exp: now + 3600, // 1 hour
        }
    }

    /// Exchange a signed JWT assertion for an access token.
    async fn fetch_token(&self) -> Result<CachedToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| IngestError::AuthenticationError(format!("System clock error: {}", e)))?
            .as_secs();

        let header = Header::new(Algorithm::RS256);
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())?;
        let jwt = encode(&header, &self.claims(now), &key)?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", jwt.as_str()),
        ];

        debug!("Exchanging the service account assertion for an access token");
        let response = self
            .client
            .post(self.token_uri())
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::AuthenticationError(format!(
                "Google has declined the service account key (status {}): {}",
                status, body
            )));
        }

        let token_response: TokenResponse = response.json().await?;
        debug!(token_type = %token_response.token_type, "Service account token issued");

        let expires_at = SystemTime::now() + Duration::from_secs(token_response.expires_in);

        Ok(CachedToken {
            access_token: token_response.access_token,
            expires_at,
        })
    }
}
