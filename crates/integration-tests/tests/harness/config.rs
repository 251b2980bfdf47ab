//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use secrecy::SecretString;
use whisperpod_config::{Config, EngineConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Point the engine at a mock inference server
    pub fn with_engine(mut self, base_url: &str) -> Self {
        self.config.engine = EngineConfig {
            base_url: base_url.parse().expect("valid URL"),
            api_key: Some(SecretString::from("test-key")),
            ..EngineConfig::default()
        };
        self
    }

    /// Set the model identifier reported in responses
    pub fn with_model(mut self, name: &str) -> Self {
        self.config.model.name = name.to_owned();
        self
    }

    /// Mount the worker handler on a different route
    pub fn with_worker_path(mut self, path: &str) -> Self {
        self.config.server.worker.path = path.to_owned();
        self
    }

    /// Set the request body limit in bytes
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.config.server.worker.body_limit = limit;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test config");
        self.config
    }
}
