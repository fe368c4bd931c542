//! Content reference decoding.
//!
//! The payload left after the tag byte is a binary CID. It is decoded twice:
//! into a base-32 multibase string for logs, and into a structured [`Cid`]
//! used to build the `/ipfs/<cid>` path that gets pinned.

use alloy_primitives::Bytes;
use cid::Cid;
use multibase::Base;

use crate::error::ContentError;

/// A decoded content identifier, ready to be pinned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentReference {
    raw: Bytes,
    encoded: String,
    cid: Cid,
}

impl ContentReference {
    /// Decode the tag-stripped payload of a batcher transaction.
    pub fn decode(payload: &[u8]) -> Result<Self, ContentError> {
        let encoded = encode_base32(payload)?;
        let cid = Cid::read_bytes(payload).map_err(|e| ContentError::Identifier(e.to_string()))?;
        Ok(Self {
            raw: Bytes::from(payload.to_vec()),
            encoded,
            cid,
        })
    }

    /// Base-32 multibase encoding of the raw payload.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// IPFS path of the referenced content.
    pub fn path(&self) -> String {
        format!("/ipfs/{}", self.cid)
    }
}

impl std::fmt::Display for ContentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encoded)
    }
}

/// Encode `bytes` as base-32 multibase and check the string decodes back to them.
fn encode_base32(bytes: &[u8]) -> Result<String, ContentError> {
    let encoded = multibase::encode(Base::Base32Lower, bytes);
    let (base, decoded) =
        multibase::decode(&encoded).map_err(|e| ContentError::Encoding(e.to_string()))?;
    if base != Base::Base32Lower || decoded != bytes {
        return Err(ContentError::Encoding(format!(
            "{encoded} does not decode back to the payload"
        )));
    }
    Ok(encoded)
}
