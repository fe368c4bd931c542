//! Scripted collaborators and fixtures shared by the scenario tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use alloy_consensus::{SignableTransaction, TxEip1559, TxEnvelope};
use alloy_primitives::{address, Address, Bytes, TxKind, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use chainpin_core::{Block, BlockSource, PinClient, ScanError, BATCH_TAG};
use cid::multihash::Multihash;
use cid::Cid;

pub const INBOX: Address = address!("ff000000000000000000000000000000000420fc");
pub const NOW: i64 = 1_700_000_000;
/// Comfortably older than the tip margin.
pub const OLD: u64 = 1_690_000_000;

// ─── Fixtures ─────────────────────────────────────────────────────────────────

pub fn batcher() -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(0x11)).unwrap()
}

pub fn stranger() -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(0x22)).unwrap()
}

pub fn batcher_address() -> Address {
    batcher().address()
}

pub fn tx(signer: &PrivateKeySigner, to: Address, input: Vec<u8>) -> TxEnvelope {
    let tx = TxEip1559 {
        chain_id: 1,
        nonce: input.len() as u64,
        to: TxKind::Call(to),
        input: Bytes::from(input),
        ..Default::default()
    };
    let sig = signer.sign_hash_sync(&tx.signature_hash()).unwrap();
    tx.into_signed(sig).into()
}

pub fn cid(seed: u8) -> Cid {
    Cid::new_v1(0x55, Multihash::<64>::wrap(0x12, &[seed; 32]).unwrap())
}

/// `0xFC` followed by the binary CID.
pub fn pin_payload(seed: u8) -> Vec<u8> {
    let mut payload = vec![BATCH_TAG];
    payload.extend(cid(seed).to_bytes());
    payload
}

/// A qualifying, correctly tagged batcher transaction for `cid(seed)`.
pub fn batch_tx(seed: u8) -> TxEnvelope {
    tx(&batcher(), INBOX, pin_payload(seed))
}

pub fn ipfs_path(seed: u8) -> String {
    format!("/ipfs/{}", cid(seed))
}

pub fn block(number: u64, transactions: Vec<TxEnvelope>) -> Block {
    Block {
        number,
        hash: B256::with_last_byte(number as u8),
        timestamp: OLD,
        transactions,
    }
}

// ─── Scripted block source ────────────────────────────────────────────────────

#[derive(Default)]
struct SourceState {
    blocks: HashMap<u64, Block>,
    failures: HashMap<u64, u32>,
    fetches: Vec<u64>,
}

/// Serves blocks from a map; heights can be told to fail a number of times first.
#[derive(Clone, Default)]
pub struct ScriptedSource(Arc<Mutex<SourceState>>);

impl ScriptedSource {
    pub fn with_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let source = Self::default();
        for b in blocks {
            source.0.lock().unwrap().blocks.insert(b.number, b);
        }
        source
    }

    pub fn fail(&self, height: u64, times: u32) {
        self.0.lock().unwrap().failures.insert(height, times);
    }

    /// Heights requested so far, in order.
    pub fn fetches(&self) -> Vec<u64> {
        self.0.lock().unwrap().fetches.clone()
    }
}

#[async_trait]
impl BlockSource for ScriptedSource {
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>, ScanError> {
        let mut state = self.0.lock().unwrap();
        state.fetches.push(number);
        if let Some(left) = state.failures.get_mut(&number) {
            if *left > 0 {
                *left -= 1;
                return Err(ScanError::Rpc("connection refused".into()));
            }
        }
        Ok(state.blocks.get(&number).cloned())
    }
}

// ─── Scripted pin client ──────────────────────────────────────────────────────

#[derive(Default)]
struct PinState {
    calls: Vec<String>,
    fail_calls: HashSet<usize>,
}

/// Records every pin attempt; chosen attempts (0-based) fail.
#[derive(Clone, Default)]
pub struct ScriptedPins(Arc<Mutex<PinState>>);

impl ScriptedPins {
    pub fn failing_on(calls: impl IntoIterator<Item = usize>) -> Self {
        let pins = Self::default();
        pins.0.lock().unwrap().fail_calls.extend(calls);
        pins
    }

    /// Every attempted path, failed ones included.
    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl PinClient for ScriptedPins {
    async fn pin_add(&self, path: &str) -> Result<(), ScanError> {
        let mut state = self.0.lock().unwrap();
        let n = state.calls.len();
        state.calls.push(path.to_string());
        if state.fail_calls.contains(&n) {
            return Err(ScanError::Pin("500 Internal Server Error".into()));
        }
        Ok(())
    }
}
