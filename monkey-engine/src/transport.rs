//! Default network transports

use crate::{CorruptSender, HttpMethod, HttpSender, ReceivedResponse, TransportError};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Malformed request written by [`TcpCorruptSender`]: unknown method,
/// a header line without a colon and a non-numeric content length.
pub const CORRUPT_REQUEST: &str = "GOT /%%% HTTP/1.1\r\n\
Host localhost\r\n\
Content-Length: nope\r\n\
Connection: close\r\n\
\r\n";

/// [`HttpSender`] backed by a shared reqwest client
#[derive(Clone)]
pub struct ReqwestSender {
    client: reqwest::Client,
}

impl ReqwestSender {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::request("client", e))?;
        Ok(Self { client })
    }
}

fn to_reqwest(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Options => reqwest::Method::OPTIONS,
        HttpMethod::Head => reqwest::Method::HEAD,
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    async fn send(
        &self,
        endpoint: &str,
        method: HttpMethod,
    ) -> Result<ReceivedResponse, TransportError> {
        let response = self
            .client
            .request(to_reqwest(method), endpoint)
            .send()
            .await
            .map_err(|e| TransportError::request(endpoint, e))?;

        let status = response.status();

        // Only the status line matters. Dropping the response closes the
        // body unread, so endless or huge bodies never hold up the attack.
        drop(response);

        let received = ReceivedResponse::new(status.as_u16());
        Ok(match status.canonical_reason() {
            Some(reason) => received.with_reason(reason),
            None => received,
        })
    }
}

/// [`CorruptSender`] writing [`CORRUPT_REQUEST`] over a plain TCP connection
#[derive(Debug, Clone, Default)]
pub struct TcpCorruptSender;

impl TcpCorruptSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CorruptSender for TcpCorruptSender {
    async fn send_corrupt(&self, address: &str) -> Result<String, TransportError> {
        let mut stream = TcpStream::connect(address)
            .await
            .map_err(|source| TransportError::Connect {
                address: address.to_string(),
                source,
            })?;

        stream
            .write_all(CORRUPT_REQUEST.as_bytes())
            .await
            .map_err(|source| TransportError::Io {
                address: address.to_string(),
                source,
            })?;

        let mut raw = Vec::new();
        if let Err(source) = stream.read_to_end(&mut raw).await {
            // Servers often reset right after answering garbage
            if raw.is_empty() {
                return Err(TransportError::Io {
                    address: address.to_string(),
                    source,
                });
            }
            debug!("Connection to {} ended with {} after reply", address, source);
        }

        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}
