//! HTTP transport
//!
//! The [`Fetcher`] trait is the seam between the poll controller and the
//! network; tests substitute scripted fetchers.

use crate::error::FetchError;
use async_trait::async_trait;
use gq_core::{ClientConfig, Query};
use gq_validate::parse_body;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, trace};

/// Source of decoded JSON payloads
#[async_trait]
pub trait Fetcher: Send + Sync + std::fmt::Debug {
    /// GET `path` with `query`, returning the decoded JSON body
    ///
    /// # Errors
    /// Any transport, status or body failure.
    async fn fetch(&self, path: &str, query: &Query) -> Result<Value, FetchError>;
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    config: ClientConfig,
}

impl HttpFetcher {
    /// Build a client with the configured timeout
    ///
    /// # Errors
    /// Returns `FetchError::Client` if the TLS backend cannot initialize.
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Base URL requests are sent to
    #[inline]
    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.config.api_base
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str, query: &Query) -> Result<Value, FetchError> {
        let url = self.config.endpoint_url(path);
        debug!(%url, params = query.to_pairs().len(), "GET");

        let response = self
            .client
            .get(&url)
            .query(&query.to_pairs())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Transport(e.to_string())
            }
        })?;
        trace!(bytes = body.len(), "response body received");

        Ok(parse_body(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_fetcher_uses_config_base() {
        let config = ClientConfig::new().with_api_base("http://127.0.0.1:9/");
        let fetcher = HttpFetcher::new(&config).unwrap();
        assert_eq!(fetcher.api_base(), "http://127.0.0.1:9");
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        // Port 9 (discard) is closed on test hosts
        let config = ClientConfig::new()
            .with_api_base("http://127.0.0.1:9")
            .with_request_timeout_secs(2);
        let fetcher = HttpFetcher::new(&config).unwrap();

        let err = fetcher.fetch("/gq-core/entities", &Query::new()).await.unwrap_err();
        assert!(err.is_transport(), "{err:?}");
    }
}
