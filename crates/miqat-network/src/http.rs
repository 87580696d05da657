//! HTTP GET capability.

use std::time::Duration;

use async_trait::async_trait;
use miqat_types::MiqatError;
use reqwest::Client;
use serde_json::Value;

/// Default bound on every outgoing request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Fetches a JSON document.
///
/// Production: reqwest client with a timeout.
/// Testing: scripted responses.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// GET `url` and decode the body as JSON.
    ///
    /// # Errors
    /// Every failure (transport, timeout, non-2xx status, undecodable body)
    /// is reported as `SourceUnavailable` naming the URL.
    async fn get_json(&self, url: &str) -> Result<Value, MiqatError>;
}

pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, MiqatError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("miqat/", env!("CARGO_PKG_VERSION"), " (prayer times companion)"))
            .build()
            .map_err(|e| MiqatError::invalid_config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(timeout_secs = timeout.as_secs(), "Initialized HTTP client");
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, MiqatError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "request timed out".to_string()
            } else {
                format!("request failed: {}", e)
            };
            tracing::info!(url, %reason, "Request exception raised");
            MiqatError::source_unavailable(url, reason)
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "Request failed");
            return Err(MiqatError::source_unavailable(url, format!("HTTP {}", status.as_u16())));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| MiqatError::source_unavailable(url, format!("invalid JSON body: {}", e)))
    }
}
