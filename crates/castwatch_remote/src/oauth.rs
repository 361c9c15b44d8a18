//! OAuth2 token persistence for the remote video platform client.
//!
//! Tokens are persisted as JSON with file mode `0600`, per spec §6. The
//! refresh flow uses `oauth2`'s basic client exactly the shape
//! `botticelli_server`'s `ServerClient` applies to its own bearer token,
//! generalized to support refresh rather than a static key.

use castwatch_error::{RemoteError, RemoteErrorKind};
use chrono::{DateTime, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken, TokenResponse,
    TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};

const YOUTUBE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const YOUTUBE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// A persisted OAuth2 access/refresh token pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// Current bearer access token.
    pub access_token: String,
    /// Long-lived refresh token, if the grant issued one.
    pub refresh_token: Option<String>,
    /// Wall-clock expiry of `access_token`.
    pub expires_at: DateTime<Utc>,
}

impl StoredToken {
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at - chrono::Duration::seconds(30)
    }
}

/// Reads and writes the token file at a fixed path, keeping it mode `0600`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// A store rooted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the persisted token, if the file exists.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Option<StoredToken>, RemoteError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            RemoteError::new(RemoteErrorKind::Network(format!(
                "failed to read token file {}: {e}",
                self.path.display()
            )))
        })?;
        let token = serde_json::from_str(&raw).map_err(|e| {
            RemoteError::new(RemoteErrorKind::InvalidRequest(format!(
                "corrupt token file {}: {e}",
                self.path.display()
            )))
        })?;
        Ok(Some(token))
    }

    /// Persists `token`, creating the file with mode `0600` if it is new.
    #[instrument(skip(self, token))]
    pub fn save(&self, token: &StoredToken) -> Result<(), RemoteError> {
        let raw = serde_json::to_string_pretty(token).expect("StoredToken always serializes");
        std::fs::write(&self.path, raw).map_err(|e| {
            RemoteError::new(RemoteErrorKind::Network(format!(
                "failed to write token file {}: {e}",
                self.path.display()
            )))
        })?;
        restrict_permissions(&self.path)?;
        debug!(path = %self.path.display(), "persisted oauth token");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), RemoteError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
        RemoteError::new(RemoteErrorKind::Network(format!(
            "failed to restrict token file permissions on {}: {e}",
            path.display()
        )))
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), RemoteError> {
    Ok(())
}

type GoogleOAuthClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Refreshes an access token using the long-lived refresh token, re-persisting
/// the result through `store`.
#[instrument(skip(client_secret, store))]
pub async fn refresh_access_token(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
    store: &TokenStore,
) -> Result<StoredToken, RemoteError> {
    let client: GoogleOAuthClient = BasicClient::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(YOUTUBE_AUTH_URL.to_string()).expect("static URL is valid"))
        .set_token_uri(TokenUrl::new(YOUTUBE_TOKEN_URL.to_string()).expect("static URL is valid"));

    let http_client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client always builds");

    let response = client
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(&http_client)
        .await
        .map_err(|e| {
            warn!("oauth2 refresh failed: {e}");
            RemoteError::new(RemoteErrorKind::Authentication(e.to_string()))
        })?;

    let expires_in = response
        .expires_in()
        .unwrap_or(std::time::Duration::from_secs(3600));
    let token = StoredToken {
        access_token: response.access_token().secret().clone(),
        refresh_token: response
            .refresh_token()
            .map(|t| t.secret().clone())
            .or_else(|| Some(refresh_token.to_string())),
        expires_at: Utc::now() + chrono::Duration::from_std(expires_in).unwrap_or_default(),
    };
    store.save(&token)?;
    Ok(token)
}

/// Returns a token guaranteed not to be within 30 s of expiry, refreshing
/// first if necessary.
pub async fn ensure_fresh(
    client_id: &str,
    client_secret: &str,
    store: &TokenStore,
) -> Result<StoredToken, RemoteError> {
    if let Some(token) = store.load()? {
        if !token.is_expired() {
            return Ok(token);
        }
        if let Some(refresh_token) = &token.refresh_token {
            return refresh_access_token(client_id, client_secret, refresh_token, store).await;
        }
    }
    Err(RemoteError::new(RemoteErrorKind::Authentication(
        "no usable oauth token on disk; run the initial authorization flow out of band"
            .to_string(),
    )))
}
