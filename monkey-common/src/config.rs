//! Configuration file model and validation

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "fuzz-monkey.json";

/// HTTP methods an attack may name explicitly. An empty method means
/// "pick one of these at random for every request".
pub const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "HEAD"];

/// Object representation of the config file provided by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
}

/// A single target and the attacks to run against it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub attacks: Vec<AttackConfig>,
}

/// Kind of traffic an attack generates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttackKind {
    HttpSpam,
    CorruptHttp,
    UrlQuery,
}

impl AttackKind {
    pub fn all() -> &'static [AttackKind] {
        &[AttackKind::HttpSpam, AttackKind::CorruptHttp, AttackKind::UrlQuery]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttackKind::HttpSpam => "HTTP Spam",
            AttackKind::CorruptHttp => "Corrupt HTTP",
            AttackKind::UrlQuery => "URL Query",
        }
    }
}

impl fmt::Display for AttackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters for one attack on an endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackConfig {
    #[serde(rename = "type")]
    pub kind: AttackKind,
    #[serde(default)]
    pub expected_status: String,
    /// Number of concurrent workers
    #[serde(default)]
    pub concurrents: usize,
    #[serde(default)]
    pub messages_per_concurrent: usize,
    /// Empty means a random method per request
    #[serde(default)]
    pub method: String,
    /// Comma separated query parameter names
    #[serde(default)]
    pub parameters: String,
}

impl AttackConfig {
    /// Total number of requests an HTTP Spam attack sends
    pub fn message_count(&self) -> usize {
        self.concurrents.saturating_mul(self.messages_per_concurrent)
    }

    /// Declared query parameter names, trimmed, empties dropped
    pub fn parameter_list(&self) -> Vec<String> {
        self.parameters
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether the configured method is empty or one of [`SUPPORTED_METHODS`]
    pub fn has_supported_method(&self) -> bool {
        let method = self.method.trim();
        method.is_empty()
            || SUPPORTED_METHODS
                .iter()
                .any(|m| m.eq_ignore_ascii_case(method))
    }
}

impl Config {
    /// Check the structural rules a config must satisfy before any attack runs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoints.is_empty() {
            return Err(ConfigError::NoEndpoints);
        }

        for (i, endpoint) in self.endpoints.iter().enumerate() {
            if endpoint.name.trim().is_empty() {
                return Err(ConfigError::MissingEndpointName { index: i + 1 });
            }

            if endpoint.host.trim().is_empty() {
                return Err(ConfigError::MissingHost {
                    endpoint: endpoint.name.clone(),
                });
            }

            if endpoint.attacks.is_empty() {
                return Err(ConfigError::NoAttacks {
                    endpoint: endpoint.name.clone(),
                });
            }

            for attack in &endpoint.attacks {
                if !attack.has_supported_method() {
                    return Err(ConfigError::UnsupportedMethod {
                        endpoint: endpoint.name.clone(),
                        method: attack.method.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Number of attacks across all endpoints
    pub fn attack_count(&self) -> usize {
        self.endpoints.iter().map(|e| e.attacks.len()).sum()
    }
}

/// Parse and validate a JSON config document
pub fn parse_config(contents: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load a config file, falling back to [`DEFAULT_CONFIG_PATH`]
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_config(&contents)
}
