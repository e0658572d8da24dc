use std::time::Duration;

use common_config::env_override;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5002";
pub const DEFAULT_TIMEOUT_MS: u64 = 200;

/// Location of the token service and the budget for a single lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl OAuthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Reads `{prefix}OAUTH_BASE_URL` and `{prefix}OAUTH_TIMEOUT_MS`.
    pub fn apply_environment_overrides(&mut self, prefix: &str) {
        env_override(&format!("{prefix}OAUTH_BASE_URL"), &mut self.base_url);
        env_override(&format!("{prefix}OAUTH_TIMEOUT_MS"), &mut self.timeout_ms);
    }
}
