//! Scanner configuration.

use std::time::Duration;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::types::BatcherConfig;

/// Batcher EOA whose inbox transactions get pinned by default.
pub const DEFAULT_BATCHER: Address = address!("6017f75108f251a488b045a7ce2a7c15b179d1f2");

/// Batcher inbox scanned by default.
pub const DEFAULT_INBOX: Address = address!("ff000000000000000000000000000000000420fc");

/// L1 block of the default chain's L2 genesis.
pub const DEFAULT_START_BLOCK: u64 = 19_135_636;

/// Configuration for a scanner instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Sender/recipient pair a transaction must match.
    pub batcher: BatcherConfig,
    /// First block to scan when no checkpoint is stored.
    pub start_block: u64,
    /// Optional last block (inclusive). `None` = run forever.
    pub to_block: Option<u64>,
    /// Also persist the checkpoint every N completed blocks.
    /// `None` = persist only after successful pins.
    pub checkpoint_interval: Option<u64>,
    /// Per-call timeout for block fetches (milliseconds).
    pub fetch_timeout_ms: u64,
    /// Pause after a failed block fetch (milliseconds).
    pub fetch_retry_delay_ms: u64,
    /// Blocks younger than this are not processed yet (seconds).
    pub tip_margin_secs: u64,
    /// Pause when the scanner has caught up with the tip margin (milliseconds).
    pub tip_poll_delay_ms: u64,
    /// Pause after a payload could not be string-encoded (milliseconds).
    pub content_retry_delay_ms: u64,
    /// Pause after a failed pin request (milliseconds).
    pub pin_retry_delay_ms: u64,
    /// Timeout for a single pin request (milliseconds).
    pub pin_timeout_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            batcher: BatcherConfig::new(DEFAULT_BATCHER, DEFAULT_INBOX),
            start_block: DEFAULT_START_BLOCK,
            to_block: None,
            checkpoint_interval: None,
            fetch_timeout_ms: 30_000,
            fetch_retry_delay_ms: 60_000,
            tip_margin_secs: 30 * 60,
            tip_poll_delay_ms: 60_000,
            content_retry_delay_ms: 5 * 60_000,
            pin_retry_delay_ms: 10_000,
            pin_timeout_ms: 10 * 60_000,
        }
    }
}

impl ScannerConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn fetch_retry_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_delay_ms)
    }

    pub fn tip_poll_delay(&self) -> Duration {
        Duration::from_millis(self.tip_poll_delay_ms)
    }

    pub fn content_retry_delay(&self) -> Duration {
        Duration::from_millis(self.content_retry_delay_ms)
    }

    pub fn pin_retry_delay(&self) -> Duration {
        Duration::from_millis(self.pin_retry_delay_ms)
    }

    pub fn pin_timeout(&self) -> Duration {
        Duration::from_millis(self.pin_timeout_ms)
    }

    /// Reject settings the scanner cannot run with.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.fetch_timeout_ms == 0 || self.pin_timeout_ms == 0 {
            return Err(ScanError::Config("timeouts must be non-zero".into()));
        }
        if let Some(to) = self.to_block {
            if to < self.start_block {
                return Err(ScanError::Config(format!(
                    "to_block {to} is below start_block {}",
                    self.start_block
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_mainnet_deployment() {
        let cfg = ScannerConfig::default();
        assert_eq!(cfg.start_block, 19_135_636);
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.fetch_retry_delay(), Duration::from_secs(60));
        assert_eq!(cfg.tip_margin_secs, 1800);
        assert_eq!(cfg.pin_retry_delay(), Duration::from_secs(10));
        assert_eq!(cfg.content_retry_delay(), Duration::from_secs(300));
        assert_eq!(
            cfg.batcher.batcher,
            "0x6017f75108f251a488B045A7ce2a7C15b179d1f2".parse::<Address>().unwrap()
        );
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: ScannerConfig =
            serde_json::from_str(r#"{ "start_block": 42, "checkpoint_interval": 100 }"#).unwrap();
        assert_eq!(cfg.start_block, 42);
        assert_eq!(cfg.checkpoint_interval, Some(100));
        assert_eq!(cfg.pin_retry_delay_ms, 10_000);
        assert_eq!(cfg.batcher.inbox, DEFAULT_INBOX);
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let cfg = ScannerConfig {
            start_block: 100,
            to_block: Some(99),
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(ScanError::Config(_))));
    }
}
