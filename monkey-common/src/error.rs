//! Error types for configuration loading

use thiserror::Error;

/// Errors raised while loading or validating a config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Endpoints can not be empty. The monkey needs victims.")]
    NoEndpoints,

    #[error("Endpoint name can not be empty for endpoint #{index}")]
    MissingEndpointName { index: usize },

    #[error("Host can not be empty for endpoint with name {endpoint}")]
    MissingHost { endpoint: String },

    #[error("Endpoint {endpoint} must have attacks associated with it")]
    NoAttacks { endpoint: String },

    #[error("Endpoint {endpoint} uses unsupported HTTP method '{method}'")]
    UnsupportedMethod { endpoint: String, method: String },
}

impl ConfigError {
    /// Whether the error came from the config contents rather than the file system
    pub fn is_invalid_config(&self) -> bool {
        !matches!(self, ConfigError::Io { .. })
    }
}
