#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod audio;
mod engine;
mod error;
mod http_client;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{Router, extract::State, routing::post};

pub use audio::TemporaryAudioFile;
pub use engine::{SegmentStream, TranscriptionEngine, TranscriptionInfo};
pub use error::{Result, SttError};
pub use server::{Server, SttServerBuilder};
pub use types::{
    AudioSource, ErrorResponse, HandlerOutput, MISSING_AUDIO_SOURCE, Segment, Task, TranscribeOptions,
    TranscriptionInput, TranscriptionResponse, WorkerRequest,
};
use request::ExtractPayload;

/// Build the transcription server from configuration
///
/// The engine is created here, once, and shared by every request.
pub fn build_server(config: &whisperpod_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        SttServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize transcription engine: {e}"))?,
    );
    Ok(server)
}

/// Create the worker router, mounted at `path`
pub fn endpoint_router(path: &str) -> Router<Arc<Server>> {
    Router::new().route(path, post(run_sync))
}

/// Handle one job envelope synchronously
async fn run_sync(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<WorkerRequest>,
) -> Result<HandlerOutput> {
    tracing::debug!("transcription handler called");

    let output = server.handle(request.input.unwrap_or_default()).await?;

    Ok(output)
}
