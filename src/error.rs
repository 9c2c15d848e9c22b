use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures creating a session token. Verification failures are not errors; see `SessionCodec::decode`.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session creation failed: no signing secret configured")]
    MissingSecret,
    #[error("Session creation failed: a lifetime of {0} days is out of range")]
    TtlOutOfRange(i64),
    #[error("Session creation failed")]
    Creation(#[source] jsonwebtoken::errors::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// HTTP status of the failed response, if the failure carried one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Request(e) | Self::Build(e) => e.status(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed")]
    AuthError,
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, msg)
            }
            Self::Upstream(msg) => {
                tracing::warn!(message = %msg, "Upstream request failed");
                (StatusCode::BAD_GATEWAY, "Upstream service unavailable".to_string())
            }
            Self::Session(e) => {
                tracing::error!(error = %e, "Session creation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session creation failed".to_string())
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
