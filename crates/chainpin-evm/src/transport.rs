//! The `RpcTransport` trait.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// Sends JSON-RPC requests to one endpoint.
///
/// Implementations do not retry; retry policy belongs to the scanner.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Next request id.
    fn next_id(&self) -> u64;

    /// Send a single request and return the raw response.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// Endpoint URL, for logging.
    fn url(&self) -> &str;

    /// Call `method` and deserialize its result.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError>
    where
        Self: Sized,
    {
        let req = JsonRpcRequest::new(self.next_id(), method, params);
        let resp = self.send(req).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        serde_json::from_value(result).map_err(TransportError::Deserialization)
    }
}
