//! Network path construction

/// Join the parts of a target into an address string.
///
/// An empty protocol yields a bare `host[:port][/path]` address, which is
/// what raw socket attacks connect to.
pub fn build_network_path(protocol: &str, host: &str, port: &str, path: &str) -> String {
    let mut address = String::with_capacity(protocol.len() + host.len() + port.len() + path.len() + 4);

    if !protocol.is_empty() {
        address.push_str(protocol);
        address.push_str("://");
    }

    address.push_str(host);

    if !port.is_empty() {
        address.push(':');
        address.push_str(port);
    }

    if !path.is_empty() {
        if !path.starts_with('/') {
            address.push('/');
        }
        address.push_str(path);
    }

    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_path() {
        assert_eq!(
            build_network_path("http", "localhost", "8080", "/my-endpoint"),
            "http://localhost:8080/my-endpoint"
        );
    }

    #[test]
    fn test_host_and_port_only() {
        assert_eq!(build_network_path("", "localhost", "8080", ""), "localhost:8080");
    }

    #[test]
    fn test_missing_slash_is_inserted() {
        assert_eq!(
            build_network_path("https", "example.com", "", "api"),
            "https://example.com/api"
        );
    }

    proptest! {
        #[test]
        fn prop_path_always_ends_with_given_path(
            host in "[a-z]{1,12}",
            port in "[0-9]{0,5}",
            path in "/[a-z/]{0,20}"
        ) {
            let address = build_network_path("http", &host, &port, &path);
            prop_assert!(address.starts_with("http://"));
            prop_assert!(address.ends_with(&path));
            prop_assert!(address.contains(&host));
        }
    }
}
