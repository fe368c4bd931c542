//! Batcher transaction validation.
//!
//! A transaction qualifies when it is sent to the inbox by the batcher. The
//! payload of a qualifying transaction must start with [`BATCH_TAG`]; the
//! remaining bytes carry the content identifier.

use alloy_consensus::{transaction::SignerRecoverable, Transaction, TxEnvelope};
use alloy_primitives::Bytes;

use crate::error::ScanError;
use crate::types::BatcherConfig;

/// First payload byte of a pinnable batch.
pub const BATCH_TAG: u8 = 0xFC;

/// Outcome of checking one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Wrong recipient or wrong sender.
    NotBatcherTx,
    /// Batcher transaction whose payload does not start with [`BATCH_TAG`].
    /// `None` when the payload is empty.
    WrongTag { tag: Option<u8> },
    /// Batcher transaction; carries the payload without its tag byte.
    Qualified(Bytes),
}

/// Check `tx` against the configured batcher/inbox pair.
///
/// A sender that cannot be recovered from the signature is an error, not a
/// mismatch: the block cannot be trusted to be processed correctly.
pub fn validate(tx: &TxEnvelope, batcher: &BatcherConfig) -> Result<Validation, ScanError> {
    match tx.to() {
        Some(to) if to == batcher.inbox => {}
        _ => return Ok(Validation::NotBatcherTx),
    }

    let from = tx.recover_signer().map_err(|e| ScanError::SenderRecovery {
        tx_hash: tx.tx_hash().to_string(),
        reason: e.to_string(),
    })?;
    if from != batcher.batcher {
        return Ok(Validation::NotBatcherTx);
    }

    let input = tx.input();
    match input.first() {
        Some(&BATCH_TAG) => Ok(Validation::Qualified(Bytes::from(input[1..].to_vec()))),
        other => Ok(Validation::WrongTag { tag: other.copied() }),
    }
}
