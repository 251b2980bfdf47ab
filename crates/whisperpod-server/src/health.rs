use axum::response::IntoResponse;
use http::StatusCode;

/// Health check handler
///
/// The engine is loaded before the listener binds, so answering at all means ready.
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
