use std::{path::Path, time::Duration};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, multipart};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use whisperpod_config::{EngineConfig, ModelConfig};

use crate::{
    error::SttError,
    http_client::http_client,
    types::{Segment, Task, TranscribeOptions},
};

use super::{SegmentStream, TranscriptionEngine, TranscriptionInfo};

/// Engine backed by an OpenAI-compatible faster-whisper server
///
/// The server holds the loaded model; this side only knows its identifier.
pub(crate) struct WhisperServerEngine {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    model: String,
    timeout: Duration,
}

impl WhisperServerEngine {
    pub fn new(model: &ModelConfig, engine: &EngineConfig) -> crate::error::Result<Self> {
        let timeout = engine.timeout().map_err(|e| SttError::ConfigError(e.to_string()))?;

        Ok(Self {
            client: http_client(),
            base_url: engine.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: engine.api_key().cloned(),
            model: model.name.clone(),
            timeout,
        })
    }

    fn endpoint(&self, task: Task) -> String {
        match task {
            Task::Transcribe => format!("{}/audio/transcriptions", self.base_url),
            Task::Translate => format!("{}/audio/translations", self.base_url),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Option<Vec<WireSegment>>,
}

#[derive(Debug, Deserialize)]
struct WireSegment {
    start: f64,
    end: f64,
    text: String,
}

impl VerboseTranscription {
    /// Split into segments and recording info
    ///
    /// Servers that answer without a segment list get a single segment
    /// covering the whole recording.
    fn into_parts(self) -> (Vec<Segment>, TranscriptionInfo) {
        let info = TranscriptionInfo {
            language: self.language.filter(|l| !l.is_empty()),
            duration: self.duration,
        };

        let segments = match self.segments {
            Some(segments) => segments
                .into_iter()
                .map(|s| Segment {
                    start: s.start,
                    end: s.end,
                    text: s.text,
                })
                .collect(),
            None if self.text.is_empty() => Vec::new(),
            None => vec![Segment {
                start: 0.0,
                end: info.duration.unwrap_or_default(),
                text: self.text,
            }],
        };

        (segments, info)
    }
}

#[async_trait]
impl TranscriptionEngine for WhisperServerEngine {
    async fn transcribe(
        &self,
        audio: &Path,
        options: &TranscribeOptions,
    ) -> crate::error::Result<(SegmentStream, TranscriptionInfo)> {
        let url = self.endpoint(options.task);
        let bytes = tokio::fs::read(audio).await?;
        let file_name = audio
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio")
            .to_string();

        tracing::debug!(
            bytes = bytes.len(),
            model = %self.model,
            task = options.task.as_str(),
            beam_size = options.beam_size.get(),
            vad_filter = options.vad_filter,
            "whisper server request"
        );

        let file = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")
            .map_err(|e| SttError::InvalidRequest(format!("Invalid content type: {e}")))?;

        let mut form = multipart::Form::new()
            .part("file", file)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment")
            .text("beam_size", options.beam_size.to_string())
            .text("vad_filter", options.vad_filter.to_string());

        if let Some(ref language) = options.language {
            form = form.text("language", language.clone());
        }

        let mut request = self.client.post(&url).timeout(self.timeout).multipart(form);

        if let Some(ref api_key) = self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("whisper server request failed: {e}");
            SttError::ConnectionError(format!("Failed to send request to whisper server: {e}"))
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

            tracing::error!("whisper server error ({status}): {error_text}");

            return Err(match status.as_u16() {
                401 => SttError::AuthenticationFailed(error_text),
                400 | 422 => SttError::InvalidRequest(error_text),
                _ => SttError::ProviderApiError {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let result: VerboseTranscription = response.json().await.map_err(|e| {
            tracing::error!("failed to parse whisper server response: {e}");
            SttError::InternalError(None)
        })?;

        let (segments, info) = result.into_parts();

        tracing::debug!(segments = segments.len(), language = ?info.language, "whisper server response");

        Ok((futures::stream::iter(segments.into_iter().map(Ok)).boxed(), info))
    }

    fn name(&self) -> &str {
        "whisper_server"
    }
}
