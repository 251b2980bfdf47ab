use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SttError>;

/// Failures that abort a transcription request
///
/// A missing audio source is not one of these: it is answered with an
/// [`ErrorResponse`](crate::ErrorResponse) instead.
#[derive(Debug, Error)]
pub enum SttError {
    /// Request parameters the engine refused
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Inline audio is not valid base64
    #[error("Invalid audio_base64: {0}")]
    InvalidAudioEncoding(String),

    /// The audio URL could not be fetched
    #[error("Failed to download audio: {0}")]
    DownloadFailed(String),

    /// Staging the audio on local disk failed
    #[error("Audio staging failed: {0}")]
    Io(#[from] std::io::Error),

    /// The engine rejected our credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The engine returned an error status
    #[error("Engine API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// The engine could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    /// If Some(message), it came from the engine and can be shown
    /// If None, it's an internal error and should not leak details
    #[error("Internal server error")]
    InternalError(Option<String>),
}

impl SttError {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidAudioEncoding(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::DownloadFailed(_) | Self::ConnectionError(_) => StatusCode::BAD_GATEWAY,
            Self::ProviderApiError { status, .. } => match *status {
                400 => StatusCode::BAD_REQUEST,
                401 => StatusCode::UNAUTHORIZED,
                403 => StatusCode::FORBIDDEN,
                413 => StatusCode::PAYLOAD_TOO_LARGE,
                429 => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Io(_) | Self::ConfigError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string for the response
    pub fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) | Self::InvalidAudioEncoding(_) => "invalid_request_error",
            Self::AuthenticationFailed(_) => "authentication_error",
            Self::DownloadFailed(_) => "download_error",
            Self::ConnectionError(_) | Self::ProviderApiError { .. } => "api_error",
            Self::Io(_) | Self::ConfigError(_) | Self::InternalError(_) => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers
    pub fn client_message(&self) -> String {
        match self {
            Self::InternalError(Some(engine_msg)) => engine_msg.clone(),
            Self::InternalError(None) | Self::Io(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for SttError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("transcription failed: {self}");
        }

        let body = ErrorBody {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}
