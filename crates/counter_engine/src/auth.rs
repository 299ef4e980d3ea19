use std::time::{Duration, Instant};

use counter_logging::{engine_info, engine_warn};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::http::{map_reqwest_error, parse_url, read_body};
use crate::{ApiSettings, FailureKind, FetchError};

/// Refresh this long before the server-side expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

/// Password-grant access token, fetched on demand and cached until it
/// expires or is invalidated.
pub struct PasswordGrant {
    client: reqwest::Client,
    settings: ApiSettings,
    cached: Mutex<Option<CachedToken>>,
}

impl PasswordGrant {
    pub fn new(client: reqwest::Client, settings: ApiSettings) -> Self {
        Self {
            client,
            settings,
            cached: Mutex::new(None),
        }
    }

    /// A usable bearer token, requesting a new one when needed.
    pub async fn token(&self) -> Result<String, FetchError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.request().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token, e.g. after the API answered 401.
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn request(&self) -> Result<CachedToken, FetchError> {
        let url = parse_url(&self.settings.token_url)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "password")
            .append_pair("username", &self.settings.username)
            .append_pair("password", &self.settings.password)
            .finish();

        let response = self
            .client
            .post(url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let bytes = read_body(response, self.settings.max_bytes)
            .await
            .map_err(|err| match err.kind {
                FailureKind::HttpStatus(401 | 403) => {
                    FetchError::new(FailureKind::Auth, err.message)
                }
                _ => err,
            })?;
        let parsed: TokenResponse = serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))?;

        match parsed.access_token {
            Some(value) if !value.is_empty() => {
                engine_info!("Access token set");
                let expires_at = parsed
                    .expires_in
                    .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN));
                Ok(CachedToken { value, expires_at })
            }
            _ => {
                let reason = parsed.error.unwrap_or_else(|| "no access_token".to_string());
                engine_warn!("Failed to get access token: {}", reason);
                Err(FetchError::new(FailureKind::Auth, reason))
            }
        }
    }
}
