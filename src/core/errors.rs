use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the indexing and answering pipelines.
///
/// Indexing treats `AcquisitionGap` and `Embedding` as per-document /
/// per-chunk skips; the answering path treats everything here as fatal
/// for the request.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("document skipped: {0}")]
    AcquisitionGap(String),
    #[error("embedding failed: {0}")]
    Embedding(String),
    #[error("vector index failed: {0}")]
    Index(String),
    #[error("completion failed: {0}")]
    Completion(String),
    #[error("image fetch failed: {0}")]
    ImageFetch(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Internal(err.to_string())
    }

    pub fn embedding<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Embedding(err.to_string())
    }

    pub fn index<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Index(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::AcquisitionGap(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            ApiError::Embedding(msg) | ApiError::Completion(msg) | ApiError::ImageFetch(msg) => {
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            ApiError::Index(msg) | ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
