//! Kubo RPC client.
//!
//! Every Kubo command is a `POST /api/v0/<command>` with arguments in the
//! query string. Only the two commands the scanner needs are implemented.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};

use chainpin_core::{PinClient, ScanError};

use crate::error::IpfsError;

/// Body of a successful `pin/add`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PinAddResponse {
    #[serde(default)]
    pub pins: Vec<String>,
}

/// Body of `version`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VersionResponse {
    pub version: String,
    #[serde(default)]
    pub commit: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorBody {
    message: String,
}

pub struct KuboClient {
    base: String,
    http: reqwest::Client,
}

impl KuboClient {
    /// `endpoint` is the RPC API root, e.g. `http://127.0.0.1:5001`.
    pub fn new(endpoint: &str) -> Result<Self, IpfsError> {
        let parsed = reqwest::Url::parse(endpoint).map_err(|e| IpfsError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(IpfsError::InvalidUrl {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        // No idle connections are kept between pins.
        let http = reqwest::Client::builder().pool_max_idle_per_host(0).build()?;

        Ok(Self {
            base: endpoint.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn command_url(&self, command: &str) -> String {
        format!("{}/api/v0/{command}", self.base)
    }

    /// Recursively pin `path` (`/ipfs/<cid>`). Returns once Kubo has the
    /// whole DAG, which can take a long time for content it has to fetch.
    pub async fn pin(&self, path: &str) -> Result<PinAddResponse, IpfsError> {
        self.post("pin/add", &[("arg", path), ("recursive", "true")])
            .await
    }

    /// Kubo daemon version; used as a connectivity check.
    pub async fn version(&self) -> Result<VersionResponse, IpfsError> {
        self.post("version", &[]).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        command: &str,
        query: &[(&str, &str)],
    ) -> Result<T, IpfsError> {
        let resp = self
            .http
            .post(self.command_url(command))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }
        serde_json::from_str(&body).map_err(|e| IpfsError::Http(format!("unexpected {command} response: {e}")))
    }
}

/// Kubo reports failures as `{"Message": "...", "Code": 0, "Type": "error"}`.
fn api_error(status: u16, body: &str) -> IpfsError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string());
    IpfsError::Api { status, message }
}

#[async_trait]
impl PinClient for KuboClient {
    async fn pin_add(&self, path: &str) -> Result<(), ScanError> {
        let resp = self.pin(path).await?;
        tracing::debug!(path, pins = ?resp.pins, "pin/add ok");
        Ok(())
    }
}
