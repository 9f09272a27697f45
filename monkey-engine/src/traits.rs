//! Transport seams used by the dispatcher and the runners

use crate::{HttpMethod, ReceivedResponse, TransportError};
use async_trait::async_trait;

/// Sends one well-formed HTTP request
#[async_trait]
pub trait HttpSender: Send + Sync {
    /// Issue `method` against `endpoint` and report the response status.
    /// Implementations must consume and drop the body before returning.
    async fn send(
        &self,
        endpoint: &str,
        method: HttpMethod,
    ) -> Result<ReceivedResponse, TransportError>;
}

/// Writes a deliberately malformed request over a raw connection
#[async_trait]
pub trait CorruptSender: Send + Sync {
    /// Connect to `address` (`host:port`), write the corrupt payload and
    /// return whatever text came back. An empty string means nothing did.
    async fn send_corrupt(&self, address: &str) -> Result<String, TransportError>;
}
