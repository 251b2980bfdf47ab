use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8001/v1";

/// Transcription engine backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Backend type
    #[serde(rename = "type", default)]
    pub engine_type: EngineType,
    /// Base URL of the inference server, including the API version prefix
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Bearer token sent to the inference server
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Upper bound on a single inference call (e.g. "10m", "90s")
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl EngineConfig {
    /// Parsed inference timeout
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout` is not a valid duration string
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid engine timeout '{}': {e}", self.timeout))
    }

    /// API key, ignoring blank values left behind by `default("")` placeholders
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_type: EngineType::default(),
            base_url: default_base_url(),
            api_key: None,
            timeout: default_timeout(),
        }
    }
}

/// Supported engine backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    /// OpenAI-compatible faster-whisper server
    #[default]
    WhisperServer,
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default engine URL must be valid")
}

fn default_timeout() -> String {
    "10m".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_engine_section() {
        let toml = r#"
            type = "whisper_server"
            base_url = "https://gpu.internal:9000/v1"
            api_key = "sk-engine"
            timeout = "90s"
        "#;

        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.engine_type, EngineType::WhisperServer);
        assert_eq!(config.base_url.as_str(), "https://gpu.internal:9000/v1");
        assert_eq!(config.api_key().unwrap().expose_secret(), "sk-engine");
        assert_eq!(config.timeout().unwrap(), Duration::from_secs(90));
    }

    #[test]
    fn blank_api_key_is_absent() {
        let config: EngineConfig = toml::from_str(r#"api_key = "  ""#).unwrap();
        assert!(config.api_key().is_none());
    }

    #[test]
    fn invalid_timeout_is_reported() {
        let config: EngineConfig = toml::from_str(r#"timeout = "soon""#).unwrap();
        let err = config.timeout().unwrap_err().to_string();
        assert!(err.contains("invalid engine timeout 'soon'"));
    }

    #[test]
    fn default_timeout_is_ten_minutes() {
        assert_eq!(EngineConfig::default().timeout().unwrap(), Duration::from_secs(600));
    }
}
