use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use serde::Deserialize;

use crate::{cloud::metadata::MetadataServer, error::LogError};

/// Environment variable holding a ready-made OAuth2 access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

const TOKEN_PATH: &str = "instance/service-accounts/default/token";

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Where the bearer token for the logging API comes from.
#[derive(Debug)]
pub enum TokenSource {
    Static(String),
    Metadata {
        server: MetadataServer,
        cached: Mutex<Option<CachedToken>>,
    },
}

#[derive(Debug, Clone)]
pub struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

impl TokenSource {
    /// Explicit token, else `GOOGLE_OAUTH_ACCESS_TOKEN`, else the metadata server.
    #[must_use]
    pub fn resolve(explicit: Option<String>) -> Self {
        explicit
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
            .map_or_else(|| Self::metadata(MetadataServer::from_env()), Self::Static)
    }

    #[must_use]
    pub fn metadata(server: MetadataServer) -> Self {
        Self::Metadata {
            server,
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token, fetching a new one when the cached token is
    /// about to expire.
    ///
    /// # Errors
    ///
    /// Metadata server transport errors, or a malformed token document.
    pub fn token(&self) -> Result<String, LogError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Metadata { server, cached } => {
                let mut cached = cached.lock().unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();
                if let Some(tok) = cached.as_ref().filter(|t| t.expires_at > now) {
                    return Ok(tok.value.clone());
                }

                let body = server.get(TOKEN_PATH)?;
                let resp: TokenResponse = serde_json::from_str(&body)?;
                let lifetime = Duration::from_secs(resp.expires_in).saturating_sub(EXPIRY_MARGIN);
                *cached = Some(CachedToken {
                    value: resp.access_token.clone(),
                    expires_at: now + lifetime,
                });
                Ok(resp.access_token)
            }
        }
    }
}
