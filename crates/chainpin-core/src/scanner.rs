//! The scan loop — fetch, validate, decode, pin, checkpoint.
//!
//! The loop is an explicit state machine. Each call to [`Scanner::step`]
//! performs one transition:
//!
//! ```text
//! Fetching ──error──────────────► Restarting ──sleep──► Fetching (same height)
//!    │ ────missing block────────► Fetching (height + 1)
//!    │ ────within tip margin────► Throttling ──sleep──► Fetching (same height)
//!    └─────block───────────────► ProcessingTx { index: 0 }
//!
//! ProcessingTx ──skip / pinned──► ProcessingTx { index + 1 }
//!    │ ────encoding / pin error─► Restarting (whole block again)
//!    │ ────past last tx────────► Fetching (height + 1) | Terminated
//!    └─────fatal error─────────► Err
//! ```
//!
//! Only one block is in flight at a time and transactions are handled in
//! ledger order, so moving past a height means everything at or below it
//! has been dealt with.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::checkpoint::CheckpointManager;
use crate::clock::{Clock, SystemClock};
use crate::config::ScannerConfig;
use crate::content::ContentReference;
use crate::error::ScanError;
use crate::pin::{PinClient, PinRequester};
use crate::source::BlockSource;
use crate::types::Block;
use crate::validator::{validate, Validation};

/// Why a block is being retried from scratch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartCause {
    /// The block could not be fetched.
    FetchFailed,
    /// A payload could not be encoded as a multibase string.
    ContentEncoding,
    /// A pin request failed.
    PinFailed,
}

impl std::fmt::Display for RestartCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FetchFailed => write!(f, "fetch-failed"),
            Self::ContentEncoding => write!(f, "content-encoding"),
            Self::PinFailed => write!(f, "pin-failed"),
        }
    }
}

/// Scanner states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// About to fetch the block at `height`.
    Fetching { height: u64 },
    /// Caught up with the tip margin; wait, then fetch `height` again.
    Throttling { height: u64, delay: Duration },
    /// Handling transaction `index` of `block`.
    ProcessingTx {
        height: u64,
        block: Block,
        index: usize,
    },
    /// Something failed; wait, then process `height` again from its first tx.
    Restarting {
        height: u64,
        delay: Duration,
        cause: RestartCause,
    },
    /// Reached the configured end block.
    Terminated,
}

impl ScanState {
    /// The block height this state refers to.
    pub fn height(&self) -> Option<u64> {
        match self {
            Self::Fetching { height }
            | Self::Throttling { height, .. }
            | Self::ProcessingTx { height, .. }
            | Self::Restarting { height, .. } => Some(*height),
            Self::Terminated => None,
        }
    }
}

/// Counters for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub blocks_processed: u64,
    pub blocks_missing: u64,
    pub pins: u64,
    pub tag_skips: u64,
    pub restarts: u64,
    pub throttles: u64,
}

/// Drives the scan loop over a block source and a pin client.
pub struct Scanner<S, P, C = SystemClock> {
    config: ScannerConfig,
    source: S,
    pinner: PinRequester<P>,
    checkpoint: CheckpointManager,
    clock: C,
    cancel: CancellationToken,
    stats: ScanStats,
}

impl<S, P, C> Scanner<S, P, C>
where
    S: BlockSource,
    P: PinClient,
    C: Clock,
{
    pub fn new(
        config: ScannerConfig,
        source: S,
        pin_client: P,
        checkpoint: CheckpointManager,
        clock: C,
        cancel: CancellationToken,
    ) -> Self {
        let pinner = PinRequester::new(pin_client, config.pin_timeout());
        Self {
            config,
            source,
            pinner,
            checkpoint,
            clock,
            cancel,
            stats: ScanStats::default(),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Resolve the start height from the checkpoint store. A checkpoint
    /// already past the end block leaves nothing to scan.
    pub async fn initial_state(&mut self) -> ScanState {
        let height = self.checkpoint.resolve_start(self.config.start_block).await;
        match self.config.to_block {
            Some(to) if height > to => {
                tracing::info!(from = height, to, "Checkpoint is past the end block, nothing to scan");
                ScanState::Terminated
            }
            _ => ScanState::Fetching { height },
        }
    }

    /// Run until the end block is reached, the token is cancelled, or an
    /// unrecoverable error occurs.
    pub async fn run(&mut self) -> Result<(), ScanError> {
        let mut state = self.initial_state().await;
        tracing::info!(
            batcher = %self.config.batcher.batcher,
            inbox = %self.config.batcher.inbox,
            from = ?state.height(),
            to = ?self.config.to_block,
            "Starting scan"
        );

        loop {
            if state == ScanState::Terminated {
                tracing::info!(stats = ?self.stats, "Scan complete");
                return Ok(());
            }
            state = self.step(state).await?;
        }
    }

    /// Perform one state transition.
    pub async fn step(&mut self, state: ScanState) -> Result<ScanState, ScanError> {
        match state {
            ScanState::Fetching { height } => self.fetch(height).await,
            ScanState::Throttling { height, delay } => {
                self.sleep(delay).await?;
                Ok(ScanState::Fetching { height })
            }
            ScanState::Restarting { height, delay, .. } => {
                self.sleep(delay).await?;
                Ok(ScanState::Fetching { height })
            }
            ScanState::ProcessingTx { height, block, index } => {
                self.process_tx(height, block, index).await
            }
            ScanState::Terminated => Ok(ScanState::Terminated),
        }
    }

    async fn fetch(&mut self, height: u64) -> Result<ScanState, ScanError> {
        tracing::debug!(block = height, "Getting batcher transactions");

        let timeout = self.config.fetch_timeout();
        let fetched = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ScanError::Cancelled),
            res = tokio::time::timeout(timeout, self.source.block_by_number(height)) => match res {
                Ok(inner) => inner,
                Err(_) => Err(ScanError::Timeout {
                    what: "block fetch",
                    ms: self.config.fetch_timeout_ms,
                }),
            },
        };

        let block = match fetched {
            Ok(Some(block)) => block,
            Ok(None) => {
                tracing::info!(block = height, "Block doesn't exist, skipping");
                self.stats.blocks_missing += 1;
                return Ok(self.complete(height).await);
            }
            Err(e) => {
                let delay = self.config.fetch_retry_delay();
                tracing::error!(
                    block = height,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Unable to fetch block, retrying"
                );
                return Ok(self.restart(height, delay, RestartCause::FetchFailed));
            }
        };

        if block.is_within(self.config.tip_margin_secs, self.clock.now()) {
            let delay = self.config.tip_poll_delay();
            tracing::info!(
                block = height,
                timestamp = block.timestamp,
                delay_ms = delay.as_millis() as u64,
                "Reached block inside the tip margin, waiting"
            );
            self.stats.throttles += 1;
            return Ok(ScanState::Throttling { height, delay });
        }

        tracing::debug!(block = height, txs = block.transactions.len(), "Processing block");
        Ok(ScanState::ProcessingTx {
            height,
            block,
            index: 0,
        })
    }

    async fn process_tx(
        &mut self,
        height: u64,
        block: Block,
        index: usize,
    ) -> Result<ScanState, ScanError> {
        let Some(tx) = block.transactions.get(index) else {
            self.stats.blocks_processed += 1;
            return Ok(self.complete(height).await);
        };
        let tx_hash = *tx.tx_hash();

        let payload = match validate(tx, &self.config.batcher)? {
            Validation::NotBatcherTx => return Ok(next_tx(height, block, index)),
            Validation::WrongTag { tag } => {
                tracing::warn!(
                    block = height,
                    tx_hash = %tx_hash,
                    prefix = ?tag.map(|t| format!("0x{t:02x}")),
                    "Skipping batcher tx without pin tag"
                );
                self.stats.tag_skips += 1;
                return Ok(next_tx(height, block, index));
            }
            Validation::Qualified(payload) => payload,
        };

        let reference = match ContentReference::decode(&payload) {
            Ok(reference) => reference,
            Err(e) if e.is_fatal() => {
                tracing::error!(block = height, tx_hash = %tx_hash, error = %e, "Can't parse CID from tx data");
                return Err(e.into());
            }
            Err(e) => {
                let delay = self.config.content_retry_delay();
                tracing::error!(
                    block = height,
                    tx_hash = %tx_hash,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Can't convert CID from tx data to string, retrying block"
                );
                return Ok(self.restart(height, delay, RestartCause::ContentEncoding));
            }
        };

        match self.pinner.pin(&reference, &self.cancel).await {
            Ok(()) => {
                tracing::info!(block = height, tx_hash = %tx_hash, cid = %reference, "Pinned IPFS data");
                self.stats.pins += 1;
                self.checkpoint.record_pin(height).await;
                Ok(next_tx(height, block, index))
            }
            Err(ScanError::Cancelled) => Err(ScanError::Cancelled),
            Err(e) => {
                let delay = self.config.pin_retry_delay();
                tracing::error!(
                    block = height,
                    tx_hash = %tx_hash,
                    cid = %reference,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Unable to pin IPFS path, retrying block"
                );
                Ok(self.restart(height, delay, RestartCause::PinFailed))
            }
        }
    }

    /// `height` is done: run the checkpoint interval hook and move on.
    async fn complete(&mut self, height: u64) -> ScanState {
        let next = height + 1;
        self.checkpoint.block_completed(next).await;
        match self.config.to_block {
            Some(to) if height >= to => ScanState::Terminated,
            _ => ScanState::Fetching { height: next },
        }
    }

    fn restart(&mut self, height: u64, delay: Duration, cause: RestartCause) -> ScanState {
        self.stats.restarts += 1;
        ScanState::Restarting {
            height,
            delay,
            cause,
        }
    }

    async fn sleep(&self, delay: Duration) -> Result<(), ScanError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ScanError::Cancelled),
            _ = self.clock.sleep(delay) => Ok(()),
        }
    }
}

fn next_tx(height: u64, block: Block, index: usize) -> ScanState {
    ScanState::ProcessingTx {
        height,
        block,
        index: index + 1,
    }
}
