//! Mock faster-whisper server for integration tests
//!
//! Implements the OpenAI-compatible audio endpoints with a canned verbose
//! transcript and records what each request carried. Also serves a static
//! audio clip so URL sources can be exercised without leaving the host.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Bytes served at `/audio/clip.wav`
pub const CLIP: &[u8] = b"RIFF\x24\x00\x00\x00WAVEfmt \x10\x00\x00\x00\x01\x00\x01\x00";

/// Mock inference server
pub struct MockWhisper {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

/// Fields of the most recent multipart request
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub fields: HashMap<String, String>,
    pub file_name: Option<String>,
    pub file_bytes: Vec<u8>,
    pub authorization: Option<String>,
}

struct MockState {
    transcription_count: AtomicU32,
    translation_count: AtomicU32,
    download_count: AtomicU32,
    /// Language reported back; `None` leaves the field empty
    language: Option<String>,
    /// Status returned instead of a transcript
    failure: Option<StatusCode>,
    last: Mutex<Option<RecordedRequest>>,
}

impl MockWhisper {
    /// Start a mock that detects Italian
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(Some("it".to_owned()), None).await
    }

    /// Start a mock whose detection reports no language
    pub async fn start_without_language() -> anyhow::Result<Self> {
        Self::start_inner(None, None).await
    }

    /// Start a mock that answers every inference call with `status`
    pub async fn start_failing(status: StatusCode) -> anyhow::Result<Self> {
        Self::start_inner(Some("it".to_owned()), Some(status)).await
    }

    async fn start_inner(language: Option<String>, failure: Option<StatusCode>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            transcription_count: AtomicU32::new(0),
            translation_count: AtomicU32::new(0),
            download_count: AtomicU32::new(0),
            language,
            failure,
            last: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1/audio/transcriptions", routing::post(handle_transcription))
            .route("/v1/audio/translations", routing::post(handle_translation))
            .route("/audio/clip.wav", routing::get(handle_clip))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for the engine configuration, including `/v1`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// URL of a path served by the mock
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Number of transcription requests received
    pub fn transcription_count(&self) -> u32 {
        self.state.transcription_count.load(Ordering::Relaxed)
    }

    /// Number of translation requests received
    pub fn translation_count(&self) -> u32 {
        self.state.translation_count.load(Ordering::Relaxed)
    }

    /// Number of times the audio clip was fetched
    pub fn download_count(&self) -> u32 {
        self.state.download_count.load(Ordering::Relaxed)
    }

    /// The most recent inference request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.state.last.lock().expect("mock state lock").clone()
    }
}

impl Drop for MockWhisper {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_transcription(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> impl IntoResponse {
    state.transcription_count.fetch_add(1, Ordering::Relaxed);
    respond(&state, headers, multipart).await
}

async fn handle_translation(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> impl IntoResponse {
    state.translation_count.fetch_add(1, Ordering::Relaxed);
    respond(&state, headers, multipart).await
}

async fn handle_clip(State(state): State<Arc<MockState>>) -> impl IntoResponse {
    state.download_count.fetch_add(1, Ordering::Relaxed);
    CLIP
}

async fn respond(state: &MockState, headers: HeaderMap, mut multipart: Multipart) -> axum::response::Response {
    let mut recorded = RecordedRequest {
        authorization: headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        ..RecordedRequest::default()
    };

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_owned();
        if name == "file" {
            recorded.file_name = field.file_name().map(str::to_owned);
            recorded.file_bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        } else {
            let value = field.text().await.unwrap_or_default();
            recorded.fields.insert(name, value);
        }
    }

    *state.last.lock().expect("mock state lock") = Some(recorded);

    if let Some(status) = state.failure {
        return (status, "inference failed").into_response();
    }

    Json(serde_json::json!({
        "task": "transcribe",
        "language": state.language.clone().unwrap_or_default(),
        "duration": 3.2,
        "text": "Buongiorno a tutti.",
        "segments": [
            {"id": 0, "seek": 0, "start": 0.0, "end": 1.4, "text": " Buongiorno"},
            {"id": 1, "seek": 0, "start": 1.4, "end": 3.2, "text": " a tutti."}
        ]
    }))
    .into_response()
}
