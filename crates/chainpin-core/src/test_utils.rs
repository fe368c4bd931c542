//! Transaction and CID fixtures for unit tests.

use alloy_consensus::{SignableTransaction, Signed, TxEip1559, TxEnvelope};
use alloy_primitives::{Address, Bytes, Signature, TxKind, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use cid::multihash::Multihash;
use cid::Cid;

/// Deterministic key derived from `seed` (must be non-zero).
pub(crate) fn signer(seed: u8) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::repeat_byte(seed)).unwrap()
}

pub(crate) fn signer_address(seed: u8) -> Address {
    signer(seed).address()
}

/// An EIP-1559 transaction on chain 1 signed by `signer`.
pub(crate) fn signed_tx(
    signer: &PrivateKeySigner,
    to: Option<Address>,
    input: impl Into<Bytes>,
) -> TxEnvelope {
    let tx = TxEip1559 {
        chain_id: 1,
        to: to.map_or(TxKind::Create, TxKind::Call),
        input: input.into(),
        ..Default::default()
    };
    let sig = signer.sign_hash_sync(&tx.signature_hash()).unwrap();
    tx.into_signed(sig).into()
}

/// A transaction whose signature has zero scalars, so no sender can be recovered.
pub(crate) fn unrecoverable_tx(to: Address, input: impl Into<Bytes>) -> TxEnvelope {
    let tx = TxEip1559 {
        chain_id: 1,
        to: TxKind::Call(to),
        input: input.into(),
        ..Default::default()
    };
    let sig = Signature::new(U256::ZERO, U256::ZERO, false);
    TxEnvelope::Eip1559(Signed::new_unchecked(tx, sig, B256::ZERO))
}

/// A CIDv1 (raw codec, sha2-256) over a digest filled with `seed`.
pub(crate) fn test_cid(seed: u8) -> Cid {
    let mh = Multihash::<64>::wrap(0x12, &[seed; 32]).unwrap();
    Cid::new_v1(0x55, mh)
}
