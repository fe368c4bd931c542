//! HTTP JSON-RPC client backed by `reqwest`.
//!
//! One request per call, no retry, no rate limiting. Transient failures are
//! surfaced to the scanner, which owns the retry policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;

/// Configuration for [`HttpRpcClient`].
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
    ids: AtomicU64,
}

impl HttpRpcClient {
    /// Create a client for `url`; the URL must be absolute `http(s)`.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let url = url.into();
        let parsed = reqwest::Url::parse(&url).map_err(|e| TransportError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl {
                reason: format!("unsupported scheme {}", parsed.scheme()),
                url,
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            url,
            http,
            request_timeout: config.request_timeout,
            ids: AtomicU64::new(1),
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpClientConfig::default())
    }

    async fn send_once(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        let resp = self
            .http
            .post(&self.url)
            .json(req)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        resp.json::<JsonRpcResponse>()
            .await
            .map_err(|e| self.classify(e))
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            e.into()
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    fn next_id(&self) -> u64 {
        self.ids.fetch_add(1, Ordering::Relaxed)
    }

    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        tracing::trace!(method = %req.method, id = %req.id, url = %self.url, "rpc request");
        self.send_once(&req).await
    }

    fn url(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_url() {
        let err = HttpRpcClient::default_for("not a url").err().unwrap();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = HttpRpcClient::default_for("ws://localhost:8546").err().unwrap();
        assert!(err.to_string().contains("unsupported scheme ws"));
    }

    #[test]
    fn ids_increase() {
        let client = HttpRpcClient::default_for("https://ethereum-rpc.publicnode.com").unwrap();
        assert_eq!(client.next_id(), 1);
        assert_eq!(client.next_id(), 2);
        assert_eq!(client.url(), "https://ethereum-rpc.publicnode.com");
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        // Port 9 (discard) on localhost is closed in any sane test environment.
        let client = HttpRpcClient::default_for("http://127.0.0.1:9").unwrap();
        let err = client.send(JsonRpcRequest::new(1, "eth_chainId", vec![])).await.unwrap_err();
        assert!(matches!(err, TransportError::Http(_) | TransportError::Timeout { .. }));
    }
}
