//! IBM Cloud Authentication
//!
//! Handles API key to IAM bearer token exchange, or a pre-obtained bearer
//! token handed over by a host shell.

use super::http::HttpClient;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

const APIKEY_GRANT_TYPE: &str = "urn:ibm:params:oauth:grant-type:apikey";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Token TTL used when IAM does not report one
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Where the bearer token comes from
#[derive(Clone)]
enum Source {
    ApiKey(String),
    Bearer(String),
}

/// Credentials holder with token caching
#[derive(Clone)]
pub struct Credentials {
    source: Source,
    iam_url: String,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl Credentials {
    /// Exactly one of `apikey` or `token` must be provided.
    pub fn new(apikey: Option<&str>, token: Option<&str>, iam_url: &str) -> Result<Self> {
        let source = match (non_empty(apikey), non_empty(token)) {
            (Some(key), None) => Source::ApiKey(key.to_string()),
            (None, Some(token)) => Source::Bearer(sanitize_token(token)),
            _ => {
                return Err(Error::config(
                    "one of apikey or token must be provided (not both)",
                ))
            }
        };

        Ok(Self {
            source,
            iam_url: iam_url.trim_end_matches('/').to_string(),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    pub fn apikey(&self) -> Option<&str> {
        match &self.source {
            Source::ApiKey(key) => Some(key),
            Source::Bearer(_) => None,
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self, http: &HttpClient) -> Result<String> {
        let apikey = match &self.source {
            Source::Bearer(token) => return Ok(token.clone()),
            Source::ApiKey(key) => key,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let mut cache = self.token_cache.write().await;
        // another task may have refreshed while we waited for the write lock
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid() {
                return Ok(cached.token.clone());
            }
        }

        let url = format!("{}/identity/token", self.iam_url);
        let response = http
            .post_form(
                &url,
                &[("grant_type", APIKEY_GRANT_TYPE), ("apikey", apikey)],
            )
            .await?;

        let token = response
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::config("IAM token response has no access_token"))?
            .to_string();
        let ttl = response
            .get("expires_in")
            .and_then(|v| v.as_u64())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);

        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER),
        });
        tracing::debug!("New token cached, expires in ~{} minutes", ttl.as_secs() / 60);

        Ok(token)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Host shells hand out tokens as "Bearer xyz"
fn sanitize_token(token: &str) -> String {
    token.trim().trim_start_matches("Bearer ").to_string()
}
