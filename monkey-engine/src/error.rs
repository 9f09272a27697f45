//! Error types for the attack engine
//!
//! None of these escape an attack run: the dispatcher turns a
//! [`TransportError`] into an in-band failure signal and the runners turn
//! every failure into an [`Outcome`](crate::Outcome).

use std::time::Duration;
use thiserror::Error;

/// Failure to complete a single request
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to {target} failed: {details}")]
    Request { target: String, details: String },

    #[error("Could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error talking to {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Timeout occurred: {operation} after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },
}

impl TransportError {
    pub fn request(target: &str, details: impl ToString) -> Self {
        Self::Request {
            target: target.to_string(),
            details: details.to_string(),
        }
    }

    pub fn timeout(operation: &str, limit: Duration) -> Self {
        Self::Timeout {
            operation: operation.to_string(),
            duration_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout { .. })
    }
}

/// Method text that does not name a supported HTTP method
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unsupported HTTP method: {method}")]
pub struct UnknownMethod {
    pub method: String,
}
