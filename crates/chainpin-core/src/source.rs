//! The ledger collaborator: blocks by number.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ScanError;
use crate::types::Block;

/// Source of full blocks (header fields plus ordered transactions).
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Fetch the block at `number`. `Ok(None)` means the node has no such block.
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>, ScanError>;
}

#[async_trait]
impl<T: BlockSource + ?Sized> BlockSource for Arc<T> {
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>, ScanError> {
        (**self).block_by_number(number).await
    }
}
