use std::{num::NonZeroU32, str::FromStr};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Message returned when a request names no audio source
pub const MISSING_AUDIO_SOURCE: &str = "Provide audio_url or audio_base64";

const DEFAULT_BEAM_SIZE: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// Job envelope delivered by the hosting runtime
///
/// A missing or `null` `input` is treated as an empty input.
#[derive(Debug, Default, Deserialize)]
pub struct WorkerRequest {
    #[serde(default)]
    pub input: Option<TranscriptionInput>,
}

/// Transcription parameters supplied by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionInput {
    /// http(s) URL of the audio to fetch
    #[serde(default)]
    pub audio_url: Option<String>,
    /// Inline base64-encoded audio bytes
    #[serde(default)]
    pub audio_base64: Option<String>,
    /// ISO 639-1 language hint; absent means auto-detect
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub task: Task,
    /// Decoding beam width
    #[serde(default = "default_beam_size")]
    pub beam_size: NonZeroU32,
    /// Drop non-speech audio before decoding
    #[serde(default = "default_vad_filter")]
    pub vad_filter: bool,
}

impl Default for TranscriptionInput {
    fn default() -> Self {
        Self {
            audio_url: None,
            audio_base64: None,
            language: None,
            task: Task::default(),
            beam_size: DEFAULT_BEAM_SIZE,
            vad_filter: true,
        }
    }
}

impl TranscriptionInput {
    /// Where the audio comes from, if the request names a usable source
    ///
    /// A URL wins when both fields are set. Only the empty string counts as
    /// absent; a whitespace-only value is a source and fails downstream.
    pub fn audio_source(&self) -> Option<AudioSource<'_>> {
        fn present(value: Option<&String>) -> Option<&str> {
            value.map(String::as_str).filter(|v| !v.is_empty())
        }

        present(self.audio_url.as_ref())
            .map(AudioSource::Url)
            .or_else(|| present(self.audio_base64.as_ref()).map(AudioSource::Base64))
    }

    /// Engine parameters carried through unchanged
    pub fn options(&self) -> TranscribeOptions {
        TranscribeOptions {
            language: self.language.clone().filter(|l| !l.trim().is_empty()),
            task: self.task,
            beam_size: self.beam_size,
            vad_filter: self.vad_filter,
        }
    }
}

/// Resolved audio source of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioSource<'a> {
    Url(&'a str),
    Base64(&'a str),
}

impl AudioSource<'_> {
    /// Metric label for the source kind
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Base64(_) => "base64",
        }
    }
}

/// Inference task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Speech to text in the spoken language
    #[default]
    Transcribe,
    /// Speech to English text
    Translate,
}

impl Task {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Translate => "translate",
        }
    }
}

impl FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcribe" => Ok(Self::Transcribe),
            "translate" => Ok(Self::Translate),
            other => Err(format!("unknown task '{other}', expected 'transcribe' or 'translate'")),
        }
    }
}

/// Parameters forwarded to the transcription engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeOptions {
    pub language: Option<String>,
    pub task: Task,
    pub beam_size: NonZeroU32,
    pub vad_filter: bool,
}

impl Default for TranscribeOptions {
    fn default() -> Self {
        TranscriptionInput::default().options()
    }
}

/// Time-stamped span of decoded text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub text: String,
}

/// Successful transcription result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    /// All segment texts concatenated in order, trimmed
    pub text: String,
    /// Detected language, or the requested one when detection reports nothing
    pub language: Option<String>,
    /// Audio duration in seconds
    pub duration: Option<f64>,
    pub segments: Vec<Segment>,
    /// Identifier of the model that produced the transcript
    pub model: String,
}

/// Structured rejection of a request that cannot be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn missing_audio_source() -> Self {
        Self {
            error: MISSING_AUDIO_SOURCE.to_string(),
        }
    }
}

/// Value produced by the request handler
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HandlerOutput {
    Transcription(TranscriptionResponse),
    Rejected(ErrorResponse),
}

impl IntoResponse for HandlerOutput {
    fn into_response(self) -> Response {
        match self {
            Self::Transcription(response) => (StatusCode::OK, Json(response)).into_response(),
            Self::Rejected(rejection) => (StatusCode::BAD_REQUEST, Json(rejection)).into_response(),
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_beam_size() -> NonZeroU32 {
    DEFAULT_BEAM_SIZE
}

#[allow(clippy::missing_const_for_fn)]
fn default_vad_filter() -> bool {
    true
}
