//! Metric names and recording helpers

use std::time::Instant;

use opentelemetry::metrics::{Histogram, Meter};

/// Instrumentation scope for every worker instrument
pub const METER_NAME: &str = "whisperpod";

/// Meter from the globally installed provider (no-op until telemetry is initialized)
pub fn meter() -> Meter {
    opentelemetry::global::meter(METER_NAME)
}

/// Record the time elapsed since `start` on a histogram, in seconds
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[opentelemetry::KeyValue]) {
    let duration = start.elapsed().as_secs_f64();
    histogram.record(duration, attributes);
}

// Transcription metric names
pub const STT_REQUEST_DURATION: &str = "stt.request.duration";
pub const STT_REQUEST_COUNT: &str = "stt.request.count";
pub const STT_AUDIO_DURATION: &str = "stt.audio.duration";
