//! Error types for the chainpin scan loop.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while scanning, decoding, pinning or checkpointing.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("{what} timed out after {ms}ms")]
    Timeout { what: &'static str, ms: u64 },

    #[error("Pin error: {0}")]
    Pin(String),

    #[error("cannot recover sender of tx {tx_hash}: {reason}")]
    SenderRecovery { tx_hash: String, reason: String },

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Scanner cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl ScanError {
    /// Returns `true` if the scanner must stop instead of backing off and retrying.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Rpc(_) | Self::Timeout { .. } | Self::Pin(_) | Self::Checkpoint(_) => false,
            Self::Content(e) => e.is_fatal(),
            Self::SenderRecovery { .. } | Self::Config(_) | Self::Other(_) => true,
            Self::Cancelled => true,
        }
    }

    /// Returns `true` if the error is an external shutdown request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failures while turning a tagged payload into a content reference.
///
/// The two kinds carry different severities: a failed string encoding is
/// waited out and the block retried, a failed identifier parse stops the
/// process.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("cannot encode payload as a multibase string: {0}")]
    Encoding(String),

    #[error("cannot parse content identifier from payload: {0}")]
    Identifier(String),
}

impl ContentError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }
}

/// Checkpoint persistence errors. None of them stop the scanner.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("no checkpoint at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("unable to read checkpoint {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to decode checkpoint {}: {content:?}", path.display())]
    Malformed { path: PathBuf, content: String },

    #[error("unable to write checkpoint {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },
}
