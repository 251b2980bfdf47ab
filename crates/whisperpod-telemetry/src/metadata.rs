use opentelemetry::KeyValue;
use opentelemetry_sdk::Resource;
use opentelemetry_semantic_conventions::resource as semconv;
use whisperpod_config::{ModelConfig, TelemetryConfig};

/// Build an OpenTelemetry Resource describing this worker and its model
pub fn build_resource(config: &TelemetryConfig, model: &ModelConfig) -> Resource {
    let mut attrs = vec![
        KeyValue::new(semconv::SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(semconv::SERVICE_VERSION, env!("CARGO_PKG_VERSION").to_string()),
        KeyValue::new("stt.model.name", model.name.clone()),
        KeyValue::new("stt.model.compute_type", model.compute_type.as_str()),
        KeyValue::new("stt.model.device", model.device.as_str()),
    ];

    for (key, value) in &config.resource_attributes {
        attrs.push(KeyValue::new(key.clone(), value.clone()));
    }

    Resource::builder().with_attributes(attrs).build()
}
