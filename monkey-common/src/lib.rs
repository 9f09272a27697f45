//! Common configuration model for fuzz-monkey
//!
//! Endpoint and attack descriptions shared by the attack engine and the
//! command line front end, together with config file loading and the
//! network path builder.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod network;

pub use config::{
    load_config, parse_config, AttackConfig, AttackKind, Config, EndpointConfig,
    DEFAULT_CONFIG_PATH, SUPPORTED_METHODS,
};
pub use error::ConfigError;
pub use network::build_network_path;
