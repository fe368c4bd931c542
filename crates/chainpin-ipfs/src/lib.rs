//! chainpin-ipfs — pin content on an IPFS Kubo node over its HTTP RPC API.

pub mod client;
pub mod error;

pub use client::{KuboClient, PinAddResponse, VersionResponse};
pub use error::IpfsError;
