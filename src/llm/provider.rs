use async_trait::async_trait;

use super::types::ChatMessage;
use crate::core::errors::ApiError;

/// Capability interface over the embedding provider. Test doubles return
/// fixed vectors so pipeline tests never touch the network.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed one text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError>;
}

/// Capability interface over the completion provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run the messages through the model and return the top response text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ApiError>;
}
