use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::core::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    /// Inline data URL, or a remote URL fetched at request time.
    pub image: Option<String>,
}

pub async fn answer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".into()));
    }

    let answer = state
        .answerer
        .answer(&payload.question, payload.image.as_deref())
        .await?;

    Ok(Json(answer))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let indexed = state.index.count().await.unwrap_or(0);
    Ok(Json(json!({
        "status": "ok",
        "indexed_chunks": indexed,
    })))
}
