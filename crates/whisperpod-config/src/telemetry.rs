//! OTLP export settings
//!
//! Logging is always on; this section only decides whether spans and metrics
//! also leave the process. Traces and metrics share `exporter` unless their
//! own section names a different collector.

use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use url::Url;

const DEFAULT_METRICS_INTERVAL: &str = "30s";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute
    #[serde(default = "default_service_name")]
    pub service_name: String,
    /// Extra resource attributes (pod id, GPU type, region)
    #[serde(default)]
    pub resource_attributes: HashMap<String, String>,
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
    #[serde(default)]
    pub tracing: Option<TracingConfig>,
    #[serde(default)]
    pub metrics: Option<MetricsConfig>,
}

impl TelemetryConfig {
    /// Collector for spans
    pub fn trace_exporter(&self) -> Option<&ExporterConfig> {
        self.tracing
            .as_ref()
            .and_then(|t| t.exporter.as_ref())
            .or(self.exporter.as_ref())
    }

    /// Collector for metrics
    pub fn metrics_exporter(&self) -> Option<&ExporterConfig> {
        self.metrics
            .as_ref()
            .and_then(|m| m.exporter.as_ref())
            .or(self.exporter.as_ref())
    }

    /// Fraction of root spans kept
    pub fn sampling_rate(&self) -> f64 {
        self.tracing.as_ref().map_or(1.0, |t| t.sampling_rate)
    }

    /// Whether an incoming parent's sampling decision is honored
    pub fn parent_based(&self) -> bool {
        self.tracing.as_ref().is_none_or(|t| t.parent_based)
    }

    /// Time between metric exports
    ///
    /// # Errors
    ///
    /// Returns an error if `metrics.interval` is not a valid duration string
    pub fn metrics_interval(&self) -> anyhow::Result<Duration> {
        let raw = self
            .metrics
            .as_ref()
            .map_or(DEFAULT_METRICS_INTERVAL, |m| m.interval.as_str());

        duration_str::parse(raw).map_err(|e| anyhow::anyhow!("invalid telemetry.metrics.interval '{raw}': {e}"))
    }
}

/// OTLP collector endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub endpoint: Url,
    #[serde(default)]
    pub protocol: ExportProtocol,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProtocol {
    #[default]
    Grpc,
    HttpProto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TracingConfig {
    /// Between 0.0 and 1.0
    #[serde(default = "default_sampling_rate")]
    pub sampling_rate: f64,
    #[serde(default = "default_parent_based")]
    pub parent_based: bool,
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Export period, e.g. "30s"
    #[serde(default = "default_metrics_interval")]
    pub interval: String,
    #[serde(default)]
    pub exporter: Option<ExporterConfig>,
}

fn default_service_name() -> String {
    "whisperpod".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_sampling_rate() -> f64 {
    1.0
}

#[allow(clippy::missing_const_for_fn)]
fn default_parent_based() -> bool {
    true
}

fn default_metrics_interval() -> String {
    DEFAULT_METRICS_INTERVAL.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_exporter_overrides_shared_one() {
        let toml = r#"
            service_name = "whisperpod-eu"

            [exporter]
            endpoint = "http://collector:4317"

            [metrics]
            interval = "10s"

            [metrics.exporter]
            endpoint = "http://metrics:4318"
            protocol = "http_proto"
        "#;

        let config: TelemetryConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.service_name, "whisperpod-eu");
        assert_eq!(config.trace_exporter().unwrap().endpoint.as_str(), "http://collector:4317/");

        let metrics = config.metrics_exporter().unwrap();
        assert_eq!(metrics.endpoint.as_str(), "http://metrics:4318/");
        assert_eq!(metrics.protocol, ExportProtocol::HttpProto);
        assert_eq!(config.metrics_interval().unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn empty_section_exports_nothing() {
        let config: TelemetryConfig = toml::from_str("").unwrap();
        assert_eq!(config.service_name, "whisperpod");
        assert!(config.trace_exporter().is_none());
        assert!(config.metrics_exporter().is_none());
        assert_eq!(config.metrics_interval().unwrap(), Duration::from_secs(30));
        assert!((config.sampling_rate() - 1.0).abs() < f64::EPSILON);
        assert!(config.parent_based());
    }

    #[test]
    fn tracing_overrides() {
        let config: TelemetryConfig = toml::from_str("[tracing]\nsampling_rate = 0.25\nparent_based = false\n").unwrap();
        assert!((config.sampling_rate() - 0.25).abs() < f64::EPSILON);
        assert!(!config.parent_based());
    }
}
