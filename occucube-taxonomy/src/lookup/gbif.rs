/// GBIF species API client
use async_trait::async_trait;
use occucube_core::config::LookupConfig;
use occucube_core::{CubeError, CubeResult, TaxonKey};
use reqwest::StatusCode;
use std::time::Duration;
use url::Url;

use super::TaxonomyLookup;
use crate::record::TaxonMetadata;
use crate::resilience::{with_retry_async, RetryPolicy};

/// Client for `GET {base}/species/{key}`
#[derive(Debug, Clone)]
pub struct GbifClient {
    base_url: Url,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl GbifClient {
    /// Create a client; `timeout` bounds each HTTP attempt
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> CubeResult<Self> {
        // Url::join drops the last segment unless the base ends with '/'
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized).map_err(|e| {
            CubeError::Configuration(format!("Invalid lookup base URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CubeError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &LookupConfig) -> CubeResult<Self> {
        Ok(Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )?
        .with_retry_policy(RetryPolicy::for_network(config.max_retries)))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn species_url(&self, key: TaxonKey) -> CubeResult<Url> {
        self.base_url
            .join(&format!("species/{}", key))
            .map_err(|e| CubeError::Configuration(format!("Cannot build species URL: {}", e)))
    }

    /// One attempt, mapping HTTP outcomes onto retryable and final errors
    async fn fetch(&self, key: TaxonKey) -> CubeResult<Option<TaxonMetadata>> {
        let url = self.species_url(key)?;
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                CubeError::Timeout(url.to_string())
            } else {
                CubeError::Network(format!("{}: {}", url, e))
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(CubeError::Network(format!("{} returned {}", url, status)));
        }
        if !status.is_success() {
            return Err(CubeError::Lookup {
                key,
                message: format!("species API returned {}", status),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                CubeError::Timeout(url.to_string())
            } else {
                CubeError::Network(format!("Failed to read body from {}: {}", url, e))
            }
        })?;

        let metadata: TaxonMetadata = serde_json::from_str(&body).map_err(|e| {
            CubeError::Parse(format!("Unexpected species record for {}: {}", key, e))
        })?;

        Ok(Some(metadata))
    }
}

#[async_trait]
impl TaxonomyLookup for GbifClient {
    async fn resolve(&self, key: TaxonKey) -> CubeResult<Option<TaxonMetadata>> {
        let context = format!("species lookup {}", key);
        with_retry_async(|| self.fetch(key), &self.retry, &context).await
    }
}
