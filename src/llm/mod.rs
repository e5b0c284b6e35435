//! Provider boundaries: embeddings and chat completions.

mod openai;
mod provider;
mod types;

pub use openai::OpenAiProvider;
pub use provider::{CompletionProvider, EmbeddingProvider};
pub use types::{ChatMessage, ContentPart, ImageUrl, MessageContent};
