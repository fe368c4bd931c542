//! Pin requests against the content store.
//!
//! No retries happen here; the scanner decides what a failed pin means.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::content::ContentReference;
use crate::error::ScanError;

/// The content-store collaborator.
#[async_trait]
pub trait PinClient: Send + Sync {
    /// Add `path` (e.g. `/ipfs/bafy…`) to the pin set.
    async fn pin_add(&self, path: &str) -> Result<(), ScanError>;
}

#[async_trait]
impl<T: PinClient + ?Sized> PinClient for Arc<T> {
    async fn pin_add(&self, path: &str) -> Result<(), ScanError> {
        (**self).pin_add(path).await
    }
}

/// Issues one bounded pin request per content reference.
pub struct PinRequester<P> {
    client: P,
    timeout: Duration,
}

impl<P: PinClient> PinRequester<P> {
    pub fn new(client: P, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Pin `reference`, giving up after the configured timeout or when
    /// `cancel` fires.
    pub async fn pin(
        &self,
        reference: &ContentReference,
        cancel: &CancellationToken,
    ) -> Result<(), ScanError> {
        let path = reference.path();
        tracing::debug!(path = %path, "Pinning");
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ScanError::Cancelled),
            res = tokio::time::timeout(self.timeout, self.client.pin_add(&path)) => match res {
                Ok(inner) => inner,
                Err(_) => Err(ScanError::Timeout {
                    what: "pin request",
                    ms: self.timeout.as_millis() as u64,
                }),
            },
        }
    }
}
