use std::net::SocketAddr;

use serde::Deserialize;

/// Default route that accepts the `{ "input": ... }` envelope
pub const DEFAULT_WORKER_PATH: &str = "/runsync";

/// Inline base64 audio is roughly 4/3 the size of the file it encodes
const DEFAULT_BODY_LIMIT: usize = 64 << 20;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

/// Health check endpoint configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_health_path")]
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_health_path(),
        }
    }
}

/// Transcription worker endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// Route the worker handler is mounted on
    #[serde(default = "default_worker_path")]
    pub path: String,
    /// Maximum accepted request body, in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            path: default_worker_path(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_enabled() -> bool {
    true
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_worker_path() -> String {
    DEFAULT_WORKER_PATH.to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_body_limit() -> usize {
    DEFAULT_BODY_LIMIT
}
