//! OpenAI-compatible provider client.
//!
//! One reqwest client serves both `/chat/completions` and `/embeddings`.
//! Every call carries the configured timeout; a timeout fails the call like
//! any other transport error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::{CompletionProvider, EmbeddingProvider};
use super::types::ChatMessage;
use crate::core::config::AppConfig;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: Option<String>,
    embedding_model: String,
    completion_model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: &AppConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            embedding_model: config.embedding_model.clone(),
            completion_model: config.completion_model.clone(),
            client,
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        builder
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let body = json!({
            "model": self.embedding_model,
            "input": text,
        });

        let res = self
            .post("/embeddings")
            .json(&body)
            .send()
            .await
            .map_err(ApiError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Embedding(format!("{}: {}", status, text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::embedding)?;
        let vector: Vec<f32> = payload["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| ApiError::Embedding("response carried no embedding".to_string()))?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();

        if vector.is_empty() {
            return Err(ApiError::Embedding("empty embedding vector".to_string()));
        }

        Ok(vector)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ApiError> {
        let body = json!({
            "model": self.completion_model,
            "messages": messages,
        });

        let res = self
            .post("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Completion(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Completion(format!("{}: {}", status, text)));
        }

        let payload: Value = res
            .json()
            .await
            .map_err(|e| ApiError::Completion(e.to_string()))?;

        payload["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::Completion("response carried no content".to_string()))
    }
}
