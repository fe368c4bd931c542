//! chainpin-evm — read blocks from an Ethereum JSON-RPC endpoint.
//!
//! - [`request`]: JSON-RPC 2.0 wire types
//! - [`transport`]: the [`RpcTransport`] trait
//! - [`client`]: HTTP transport over `reqwest`
//! - [`fetcher`]: [`EvmBlockSource`], the scanner's `BlockSource`

pub mod client;
pub mod error;
pub mod fetcher;
pub mod request;
pub mod transport;

pub use client::{HttpClientConfig, HttpRpcClient};
pub use error::TransportError;
pub use fetcher::EvmBlockSource;
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use transport::RpcTransport;
