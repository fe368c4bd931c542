//! EVM block source.
//!
//! Uses `eth_getBlockByNumber(<hex>, true)` so one call returns the block
//! with full transaction objects.

use alloy_consensus::TxEnvelope;
use alloy_primitives::{B256, U64};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use chainpin_core::{Block, BlockSource, ScanError};

use crate::error::TransportError;
use crate::transport::RpcTransport;

/// The subset of an RPC block object the scanner needs.
#[derive(Debug, Deserialize)]
struct RpcBlock {
    number: U64,
    hash: B256,
    timestamp: U64,
    #[serde(default)]
    transactions: Vec<Value>,
}

/// [`BlockSource`] over any [`RpcTransport`].
pub struct EvmBlockSource<T> {
    transport: T,
}

impl<T: RpcTransport> EvmBlockSource<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `eth_chainId`; used as a connectivity check at startup.
    pub async fn chain_id(&self) -> Result<u64, TransportError> {
        let id: U64 = self.transport.call("eth_chainId", vec![]).await?;
        Ok(id.to::<u64>())
    }

    /// Fetch block `number` with full transactions. `Ok(None)` when the node
    /// has no such block.
    pub async fn get_block(&self, number: u64) -> Result<Option<Block>, TransportError> {
        let raw: Option<RpcBlock> = self
            .transport
            .call("eth_getBlockByNumber", vec![json!(format!("0x{number:x}")), json!(true)])
            .await?;
        raw.map(block_from_rpc).transpose()
    }
}

#[async_trait]
impl<T: RpcTransport> BlockSource for EvmBlockSource<T> {
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>, ScanError> {
        Ok(self.get_block(number).await?)
    }
}

/// Transaction types that only exist on L2s and are returned by some
/// L1-compatible nodes (OP deposits). They are never batcher transactions.
const NON_L1_TX_TYPES: &[&str] = &["0x7e"];

fn block_from_rpc(raw: RpcBlock) -> Result<Block, TransportError> {
    let number = raw.number.to::<u64>();
    let mut transactions = Vec::with_capacity(raw.transactions.len());
    for (index, tx) in raw.transactions.into_iter().enumerate() {
        if let Some(envelope) = decode_tx(number, index, tx)? {
            transactions.push(envelope);
        }
    }

    Ok(Block {
        number,
        hash: raw.hash,
        timestamp: raw.timestamp.to::<u64>(),
        transactions,
    })
}

/// A transaction that cannot be decoded fails the whole block, so the fetch
/// is retried instead of a batch being silently missed.
fn decode_tx(block: u64, index: usize, tx: Value) -> Result<Option<TxEnvelope>, TransportError> {
    let tx_type = tx.get("type").and_then(Value::as_str).map(str::to_owned);
    if let Some(ty) = tx_type.as_deref().filter(|ty| NON_L1_TX_TYPES.contains(ty)) {
        tracing::trace!(block, index, tx_type = ty, "Skipping non-L1 transaction");
        return Ok(None);
    }

    let hash = tx.get("hash").and_then(Value::as_str).map(str::to_owned);
    serde_json::from_value::<TxEnvelope>(tx).map(Some).map_err(|e| {
        tracing::warn!(
            block,
            index,
            tx_hash = ?hash,
            tx_type = ?tx_type,
            error = %e,
            "Undecodable transaction"
        );
        TransportError::Deserialization(e)
    })
}
