//! API configuration

use serde::Deserialize;

use core_kernel::CoreError;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Shared secret the calendar feed is gated on
    pub feed_secret: String,
    /// Whether the calendar feed is served at all
    pub feed_enabled: bool,
    /// Log level
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            feed_secret: "change-me-in-production".to_string(),
            feed_enabled: true,
            log_level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, CoreError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()
            .map_err(|e| CoreError::configuration(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CoreError::configuration(e.to_string()))
    }

    /// Rejects configurations that would serve the feed without a secret
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.feed_enabled && self.feed_secret.is_empty() {
            return Err(CoreError::validation(
                "feed_enabled requires a non-empty feed_secret",
            ));
        }
        Ok(())
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
