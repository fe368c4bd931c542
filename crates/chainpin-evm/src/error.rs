//! Transport-level error types.

use thiserror::Error;

use chainpin_core::ScanError;

use crate::request::JsonRpcError;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, TLS failure, non-2xx status, unreadable body.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid RPC URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<TransportError> for ScanError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout { ms } => ScanError::Timeout {
                what: "rpc request",
                ms,
            },
            TransportError::InvalidUrl { .. } => ScanError::Config(e.to_string()),
            other => ScanError::Rpc(other.to_string()),
        }
    }
}
