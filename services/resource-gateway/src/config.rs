use std::net::SocketAddr;

use common_config::{env_override, service_port, ServiceConfig};
use common_oauth::OAuthConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_address: String,
    pub port: u16,
    pub oauth: OAuthConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8082,
            oauth: OAuthConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind_address, self.port).parse()
    }
}

impl ServiceConfig for GatewayConfig {
    const PREFIX: &'static str = "RESOURCE_GATEWAY_";

    fn apply_environment_overrides(&mut self, prefix: &str) {
        env_override(&format!("{prefix}BIND_ADDRESS"), &mut self.bind_address);
        self.port = service_port(&format!("{prefix}PORT"), self.port);
        self.oauth.apply_environment_overrides(prefix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_socket_addr() {
        let config = GatewayConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8082");
        assert_eq!(config.oauth, OAuthConfig::default());
    }

    #[test]
    fn port_override_falls_back_on_garbage() {
        let mut config = GatewayConfig::default();
        std::env::set_var("RESOURCE_GATEWAY_TEST_PORT", "9100");
        config.apply_environment_overrides("RESOURCE_GATEWAY_TEST_");
        assert_eq!(config.port, 9100);

        std::env::set_var("RESOURCE_GATEWAY_TEST_PORT", "not-a-port");
        config.apply_environment_overrides("RESOURCE_GATEWAY_TEST_");
        assert_eq!(config.port, 9100);
        std::env::remove_var("RESOURCE_GATEWAY_TEST_PORT");
    }

    #[test]
    fn nested_oauth_section_from_yaml() {
        let yaml = r#"
port: 9000
oauth:
  base_url: http://oauth-api:5002
"#;
        let config: GatewayConfig = serde_yaml::from_str(yaml).expect("yaml");
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.oauth.base_url, "http://oauth-api:5002");
        assert_eq!(config.oauth.timeout_ms, 200);
    }
}
