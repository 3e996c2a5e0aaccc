use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh the cached token this long before its reported expiry.
const EXPIRY_MARGIN_SECS: u64 = 60;

/// Trait for supplying OAuth2 access tokens to the GCP REST clients.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token provider for local development and tests.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Fetches service-account tokens from the GCE metadata server, caching each
/// token until shortly before its expiry.
pub struct MetadataTokenProvider {
    http: Client,
    cached: Mutex<Option<(String, Instant)>>,
}

impl MetadataTokenProvider {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataTokenProvider {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some((token, expires_at)) = cached.as_ref() {
            if Instant::now() < *expires_at {
                return Ok(token.clone());
            }
        }

        debug!("fetching service-account token from metadata server");
        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .context("metadata server request failed")?
            .error_for_status()
            .context("metadata server returned an error status")?;

        let token: MetadataTokenResponse = response
            .json()
            .await
            .context("failed to parse metadata token response")?;

        let ttl = token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        let expires_at = Instant::now() + Duration::from_secs(ttl);
        *cached = Some((token.access_token.clone(), expires_at));

        Ok(token.access_token)
    }
}
