#![allow(clippy::must_use_candidate)]

pub mod engine;
mod env;
mod loader;
pub mod model;
pub mod server;
pub mod telemetry;

use serde::Deserialize;

pub use engine::*;
pub use model::*;
pub use server::*;
pub use telemetry::TelemetryConfig;

/// Top-level worker configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Model identity and numeric precision
    #[serde(default)]
    pub model: ModelConfig,
    /// Transcription engine backend
    #[serde(default)]
    pub engine: EngineConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
