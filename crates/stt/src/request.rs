use std::sync::Arc;

use axum::body::Body;
use serde::de::DeserializeOwned;

use crate::server::Server;

/// Extractor for JSON job envelopes
///
/// The body limit comes from the server so large inline audio can be allowed
/// without raising it for every route.
pub struct ExtractPayload<T>(pub T);

impl<T: DeserializeOwned> axum::extract::FromRequest<Arc<Server>> for ExtractPayload<T> {
    type Rejection = axum::response::Response;

    async fn from_request(request: http::Request<Body>, state: &Arc<Server>) -> Result<Self, Self::Rejection> {
        use axum::response::IntoResponse;

        let (parts, body) = request.into_parts();

        let is_json = parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if !is_json {
            return Err((
                http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "Unsupported Content-Type, expected: 'Content-Type: application/json'",
            )
                .into_response());
        }

        let limit = state.body_limit();

        let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
            if std::error::Error::source(&err)
                .is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
            {
                (
                    http::StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body is too large, limit is {limit} bytes"),
                )
            } else {
                (
                    http::StatusCode::BAD_REQUEST,
                    format!("Failed to read request body: {err}"),
                )
            }
            .into_response()
        })?;

        let payload = serde_json::from_slice::<T>(&bytes).map_err(|e| {
            (
                http::StatusCode::BAD_REQUEST,
                format!("Failed to parse request body: {e}"),
            )
                .into_response()
        })?;

        Ok(Self(payload))
    }
}
