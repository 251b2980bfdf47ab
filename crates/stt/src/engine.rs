pub(crate) mod whisper_server;

use std::path::Path;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::types::{Segment, TranscribeOptions};

/// Lazily produced segments, in time order
///
/// An `Err` item aborts the request; nothing already yielded is returned.
pub type SegmentStream = BoxStream<'static, crate::error::Result<Segment>>;

/// Facts the engine reports about the whole recording
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionInfo {
    /// Detected language code, if the engine reports one
    pub language: Option<String>,
    /// Audio duration in seconds
    pub duration: Option<f64>,
}

/// Pretrained speech recognition model
///
/// Loaded once at startup and shared read-only by every request, so
/// implementations must tolerate concurrent calls.
#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// Transcribe the audio file at `audio`
    async fn transcribe(
        &self,
        audio: &Path,
        options: &TranscribeOptions,
    ) -> crate::error::Result<(SegmentStream, TranscriptionInfo)>;

    /// Name of the engine backend
    fn name(&self) -> &str;
}
