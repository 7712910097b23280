use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures raised while staging the assets of a single scene.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Footage search failed: {0}")]
    Search(String),

    #[error("Footage download failed: {0}")]
    Fetch(String),

    #[error("No videos found for: {term}")]
    NoResults { term: String },

    #[error("Failed to write {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Video job not found: {0}")]
    NotFound(String),

    #[error("Video is not ready yet (status: {status})")]
    NotReady { status: String },

    #[error("Video file is missing from storage")]
    MissingAsset,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotReady { .. } => StatusCode::CONFLICT,
            ApiError::MissingAsset => StatusCode::GONE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "INVALID_REQUEST",
            ApiError::NotFound(_) => "JOB_NOT_FOUND",
            ApiError::NotReady { .. } => "VIDEO_NOT_READY",
            ApiError::MissingAsset => "VIDEO_MISSING",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({
                "error": {
                    "code": self.code(),
                    "message": self.to_string()
                }
            })),
        )
            .into_response()
    }
}
