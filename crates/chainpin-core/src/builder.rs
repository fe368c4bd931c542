//! Fluent builder API for scanner configuration.
//!
//! # Example
//!
//! ```rust
//! use chainpin_core::ScannerBuilder;
//!
//! let config = ScannerBuilder::new()
//!     .start_block(19_135_636)
//!     .checkpoint_interval(100)
//!     .build_config();
//! assert_eq!(config.checkpoint_interval, Some(100));
//! ```

use std::time::Duration;

use alloy_primitives::Address;

use crate::config::ScannerConfig;

/// Fluent builder for `ScannerConfig`.
#[derive(Debug, Default)]
pub struct ScannerBuilder {
    config: ScannerConfig,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
        }
    }

    /// Set the expected sender.
    pub fn batcher(mut self, batcher: Address) -> Self {
        self.config.batcher.batcher = batcher;
        self
    }

    /// Set the expected recipient.
    pub fn inbox(mut self, inbox: Address) -> Self {
        self.config.batcher.inbox = inbox;
        self
    }

    /// Set the start block used when no checkpoint is stored.
    pub fn start_block(mut self, block: u64) -> Self {
        self.config.start_block = block;
        self
    }

    /// Stop after this block (for bounded backfill).
    pub fn to_block(mut self, block: u64) -> Self {
        self.config.to_block = Some(block);
        self
    }

    /// Persist the checkpoint every N completed blocks as well.
    pub fn checkpoint_interval(mut self, n: u64) -> Self {
        self.config.checkpoint_interval = Some(n);
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn fetch_retry_delay(mut self, delay: Duration) -> Self {
        self.config.fetch_retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Blocks younger than `margin` are waited on.
    pub fn tip_margin(mut self, margin: Duration) -> Self {
        self.config.tip_margin_secs = margin.as_secs();
        self
    }

    pub fn tip_poll_delay(mut self, delay: Duration) -> Self {
        self.config.tip_poll_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn content_retry_delay(mut self, delay: Duration) -> Self {
        self.config.content_retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn pin_retry_delay(mut self, delay: Duration) -> Self {
        self.config.pin_retry_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn pin_timeout(mut self, timeout: Duration) -> Self {
        self.config.pin_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Build the `ScannerConfig`.
    pub fn build_config(self) -> ScannerConfig {
        self.config
    }
}
