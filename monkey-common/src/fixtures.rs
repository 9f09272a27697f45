//! Ready-made configurations for tests

use crate::config::{AttackConfig, AttackKind, Config, EndpointConfig};

/// Endpoint at http://localhost:8080/my-endpoint with a single-request HTTP Spam attack
pub fn endpoint_and_attack(expected_status: &str) -> (EndpointConfig, AttackConfig) {
    let endpoint = EndpointConfig {
        name: "Test Endpoint".to_string(),
        protocol: "http".to_string(),
        host: "localhost".to_string(),
        port: "8080".to_string(),
        path: "/my-endpoint".to_string(),
        attacks: Vec::new(),
    };

    let attack = AttackConfig {
        kind: AttackKind::HttpSpam,
        expected_status: expected_status.to_string(),
        concurrents: 1,
        messages_per_concurrent: 1,
        method: "GET".to_string(),
        parameters: String::new(),
    };

    (endpoint, attack)
}

/// Full config with one endpoint carrying the attack from [`endpoint_and_attack`]
pub fn full_config() -> Config {
    let (mut endpoint, attack) = endpoint_and_attack("200");
    endpoint.attacks.push(attack);

    Config {
        endpoints: vec![endpoint],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_is_valid() {
        let config = full_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.attack_count(), 1);
    }
}
