//! Kubo client errors.

use thiserror::Error;

use chainpin_core::ScanError;

#[derive(Debug, Error)]
pub enum IpfsError {
    /// The request never produced a response (refused, reset, timed out).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Kubo answered with a non-2xx status; `message` is its `Message` field
    /// when the body had one, the raw body otherwise.
    #[error("Kubo API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid IPFS endpoint {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl From<reqwest::Error> for IpfsError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

impl From<IpfsError> for ScanError {
    fn from(e: IpfsError) -> Self {
        match e {
            IpfsError::InvalidUrl { .. } => ScanError::Config(e.to_string()),
            other => ScanError::Pin(other.to_string()),
        }
    }
}
