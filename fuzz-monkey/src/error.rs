//! Error types for the fuzz-monkey front end

use monkey_common::ConfigError;
use monkey_engine::TransportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonkeyError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Transport setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to render results: {0}")]
    Serialization(#[from] serde_json::Error),
}
