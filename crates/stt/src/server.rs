use std::{path::Path, sync::Arc, time::Instant};

use futures::TryStreamExt;
use whisperpod_config::EngineType;
use whisperpod_telemetry::{
    Counter, Histogram, KeyValue,
    metrics::{self, STT_AUDIO_DURATION, STT_REQUEST_COUNT, STT_REQUEST_DURATION},
};

use crate::{
    audio::TemporaryAudioFile,
    engine::{TranscriptionEngine, TranscriptionInfo, whisper_server::WhisperServerEngine},
    error::Result,
    http_client::http_client,
    types::{AudioSource, ErrorResponse, HandlerOutput, Segment, TranscribeOptions, TranscriptionInput, TranscriptionResponse},
};

/// Request handler holding the process-wide engine handle
pub struct Server {
    engine: Arc<dyn TranscriptionEngine>,
    model: String,
    body_limit: usize,
    client: reqwest::Client,
    metrics: Metrics,
}

struct Metrics {
    request_duration: Histogram<f64>,
    request_count: Counter<u64>,
    audio_duration: Histogram<f64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = metrics::meter();

        Self {
            request_duration: meter
                .f64_histogram(STT_REQUEST_DURATION)
                .with_unit("s")
                .with_description("Time to handle a transcription request")
                .build(),
            request_count: meter
                .u64_counter(STT_REQUEST_COUNT)
                .with_description("Transcription requests by outcome")
                .build(),
            audio_duration: meter
                .f64_histogram(STT_AUDIO_DURATION)
                .with_unit("s")
                .with_description("Duration of transcribed audio")
                .build(),
        }
    }
}

impl Server {
    /// Wrap an already-loaded engine
    pub fn new(engine: Arc<dyn TranscriptionEngine>, model: impl Into<String>) -> Self {
        Self {
            engine,
            model: model.into(),
            body_limit: whisperpod_config::WorkerConfig::default().body_limit,
            client: http_client(),
            metrics: Metrics::new(),
        }
    }

    /// Override the request body limit enforced by the endpoint
    #[must_use]
    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) const fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Handle one request: validate, stage audio, transcribe, assemble, clean up
    ///
    /// A request without an audio source is answered with an error object and
    /// touches neither the network nor the filesystem. Every other failure is
    /// returned as `Err` after the staged file has been removed.
    pub async fn handle(&self, input: TranscriptionInput) -> Result<HandlerOutput> {
        let Some(source) = input.audio_source() else {
            tracing::debug!("rejecting request without audio source");
            self.metrics
                .request_count
                .add(1, &[KeyValue::new("outcome", "rejected")]);
            return Ok(HandlerOutput::Rejected(ErrorResponse::missing_audio_source()));
        };

        let options = input.options();
        let start = Instant::now();

        tracing::debug!(
            source = source.kind(),
            task = options.task.as_str(),
            language = options.language.as_deref().unwrap_or("auto"),
            "transcription request"
        );

        let result = self.run(source, &options, input.language.as_deref()).await;

        let attributes = [
            KeyValue::new("source", source.kind()),
            KeyValue::new("task", options.task.as_str()),
            KeyValue::new("outcome", if result.is_ok() { "success" } else { "error" }),
        ];
        metrics::record_duration(&self.metrics.request_duration, start, &attributes);
        self.metrics.request_count.add(1, &attributes);

        let response = result?;

        if let Some(duration) = response.duration {
            self.metrics.audio_duration.record(duration, &attributes[..2]);
        }

        tracing::debug!(
            segments = response.segments.len(),
            language = ?response.language,
            elapsed_ms = start.elapsed().as_millis(),
            "transcription complete"
        );

        Ok(HandlerOutput::Transcription(response))
    }

    async fn run(
        &self,
        source: AudioSource<'_>,
        options: &TranscribeOptions,
        requested_language: Option<&str>,
    ) -> Result<TranscriptionResponse> {
        let audio = match source {
            AudioSource::Url(url) => TemporaryAudioFile::download(&self.client, url).await?,
            AudioSource::Base64(encoded) => TemporaryAudioFile::from_base64(encoded).await?,
        };

        let result = self.transcribe_file(audio.path(), options, requested_language).await;

        audio.cleanup();

        result
    }

    async fn transcribe_file(
        &self,
        path: &Path,
        options: &TranscribeOptions,
        requested_language: Option<&str>,
    ) -> Result<TranscriptionResponse> {
        let (segments, info) = self.engine.transcribe(path, options).await?;
        let segments: Vec<Segment> = segments.try_collect().await?;

        Ok(assemble(segments, info, requested_language, &self.model))
    }
}

/// Shape engine output into the response object
///
/// `requested_language` is the caller's value as sent, echoed verbatim
/// (even when empty) when the engine reports no language.
pub(crate) fn assemble(
    segments: Vec<Segment>,
    info: TranscriptionInfo,
    requested_language: Option<&str>,
    model: &str,
) -> TranscriptionResponse {
    let text: String = segments.iter().map(|s| s.text.as_str()).collect();

    TranscriptionResponse {
        text: text.trim().to_string(),
        language: info.language.or_else(|| requested_language.map(str::to_string)),
        duration: info.duration,
        segments,
        model: model.to_string(),
    }
}

/// Builder for constructing the server from configuration
pub struct SttServerBuilder<'a> {
    config: &'a whisperpod_config::Config,
}

impl<'a> SttServerBuilder<'a> {
    pub const fn new(config: &'a whisperpod_config::Config) -> Self {
        Self { config }
    }

    /// Load the configured engine once and wrap it in a server
    pub fn build(self) -> Result<Server> {
        let model = &self.config.model;

        tracing::debug!(
            engine = ?self.config.engine.engine_type,
            model = %model.name,
            compute_type = %model.compute_type,
            device = %model.device,
            "initializing transcription engine"
        );

        let engine: Arc<dyn TranscriptionEngine> = match self.config.engine.engine_type {
            EngineType::WhisperServer => Arc::new(WhisperServerEngine::new(model, &self.config.engine)?),
        };

        tracing::debug!("transcription engine '{}' ready", engine.name());

        Ok(Server::new(engine, model.name.clone()).with_body_limit(self.config.server.worker.body_limit))
    }
}
