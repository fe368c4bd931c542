//! Shared types for the scan loop.

use alloy_consensus::TxEnvelope;
use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

// ─── Block ────────────────────────────────────────────────────────────────────

/// A fetched ledger block with its transactions in ledger order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block number.
    pub number: u64,
    /// Block hash.
    pub hash: B256,
    /// Unix timestamp of the block (seconds since epoch).
    pub timestamp: u64,
    /// Transactions, in the order they appear in the block.
    pub transactions: Vec<TxEnvelope>,
}

impl Block {
    /// Returns `true` if the block was produced less than `margin_secs` before `now`.
    pub fn is_within(&self, margin_secs: u64, now: i64) -> bool {
        let cutoff = now.saturating_sub(margin_secs as i64);
        (self.timestamp as i64) > cutoff
    }
}

// ─── BatcherConfig ────────────────────────────────────────────────────────────

/// The sender/recipient pair every transaction is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatcherConfig {
    /// Expected sender (the batcher EOA).
    pub batcher: Address,
    /// Expected recipient (the batcher inbox).
    pub inbox: Address,
}

impl BatcherConfig {
    pub const fn new(batcher: Address, inbox: Address) -> Self {
        Self { batcher, inbox }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_at(timestamp: u64) -> Block {
        Block {
            number: 100,
            hash: B256::ZERO,
            timestamp,
            transactions: vec![],
        }
    }

    #[test]
    fn block_within_margin() {
        let now = 1_700_000_000;
        assert!(block_at(1_700_000_000 - 60).is_within(1800, now));
        assert!(!block_at(1_700_000_000 - 1800).is_within(1800, now)); // exactly at the edge
        assert!(!block_at(1_700_000_000 - 7200).is_within(1800, now));
    }
}
