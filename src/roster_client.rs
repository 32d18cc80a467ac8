//! HTTP client for `konsulent-api`, used by the query service.
//!
//! One GET per call, bounded by the configured timeout, no retries.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::QueryServiceConfig;
use crate::error::error_chain;
use crate::roster::Consultant;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure: refused, timed out, DNS, broken body stream.
    #[error("Kunne ikke koble til konsulent-api: {0}")]
    Unavailable(String),

    /// The roster service answered with a non-2xx status.
    #[error("Konsulent-api returnerte feil: {0}")]
    UpstreamStatus(u16),

    /// 2xx, but the body is not a list of consultants.
    #[error("Konsulent-api returnerte ugyldig data: {0}")]
    InvalidPayload(String),
}

/// Cheap to clone — `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct RosterClient {
    client: Client,
    endpoint: String,
}

impl RosterClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        let endpoint = format!("{}/konsulenter", base_url.trim_end_matches('/'));
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &QueryServiceConfig) -> Result<Self, FetchError> {
        Self::new(
            &config.roster_url,
            Duration::from_secs(config.roster_timeout_seconds),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Fetch the full roster.
    pub async fn fetch_all(&self) -> Result<Vec<Consultant>, FetchError> {
        debug!(endpoint = %self.endpoint, "fetching roster");

        let response = self.client.get(&self.endpoint).send().await.map_err(|e| {
            let cause = error_chain(&e);
            warn!(endpoint = %self.endpoint, error = %cause, timeout = e.is_timeout(), "roster request failed (transport)");
            FetchError::Unavailable(cause)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "roster service returned error status");
            return Err(FetchError::UpstreamStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| {
            let cause = error_chain(&e);
            warn!(endpoint = %self.endpoint, error = %cause, timeout = e.is_timeout(), "failed to read roster body");
            FetchError::Unavailable(cause)
        })?;

        let consultants: Vec<Consultant> = serde_json::from_slice(&body).map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "roster body failed to decode");
            FetchError::InvalidPayload(e.to_string())
        })?;

        debug!(count = consultants.len(), "roster fetched");
        Ok(consultants)
    }
}
