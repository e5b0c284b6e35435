//! Retrieval-augmented answerer.
//!
//! Per-request pipeline: embed the question, retrieve top-k chunks, assemble
//! the context, build the (optionally multimodal) prompt, synthesize the
//! answer, and map the same retrieved records to citations. No state is kept
//! across requests; a query never mutates the index.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::image::resolve_image;
use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::index::{ScoredChunk, VectorIndex};
use crate::llm::{ChatMessage, CompletionProvider, ContentPart, EmbeddingProvider, ImageUrl};

const PROMPT_INSTRUCTION: &str =
    "You are a virtual teaching assistant for the course. Use only the context below to answer the question.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub links: Vec<Citation>,
}

/// Points the caller from the answer back to a supporting source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub url: String,
    pub text: String,
}

pub struct Answerer {
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn CompletionProvider>,
    index: Arc<dyn VectorIndex>,
    http: Client,
    top_k: usize,
}

impl Answerer {
    pub fn new(
        config: &AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn CompletionProvider>,
        index: Arc<dyn VectorIndex>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            embedder,
            llm,
            index,
            http,
            top_k: config.top_k,
        })
    }

    /// Answers a question, optionally conditioned on an image (inline data
    /// URL or a remote URL fetched at request time).
    ///
    /// An empty index is not an error: the answer degrades to ungrounded and
    /// `links` comes back empty. Embedding, completion and image-fetch
    /// failures are fatal for the request.
    pub async fn answer(&self, question: &str, image: Option<&str>) -> Result<Answer, ApiError> {
        let question_vector = self.embedder.embed(question).await?;

        // The retrieved set is used for both the context and the citations;
        // it is never re-queried in between.
        let retrieved = self.index.query(&question_vector, self.top_k).await?;

        let context = assemble_context(&retrieved);
        let prompt = format!(
            "{}\n\nContext:\n{}\n\nQuestion:\n{}",
            PROMPT_INSTRUCTION, context, question
        );

        let message = match image {
            Some(image) => {
                let data_url = resolve_image(&self.http, image).await?;
                ChatMessage::user_parts(vec![
                    ContentPart::Text { text: prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ])
            }
            None => ChatMessage::user_text(prompt),
        };

        let answer = self.llm.complete(&[message]).await?;
        let links = format_citations(&retrieved);

        Ok(Answer { answer, links })
    }
}

/// Joins retrieved chunk contents with blank lines, most relevant first.
fn assemble_context(retrieved: &[ScoredChunk]) -> String {
    retrieved
        .iter()
        .map(|scored| scored.record.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Citation order matches retrieval order.
fn format_citations(retrieved: &[ScoredChunk]) -> Vec<Citation> {
    retrieved
        .iter()
        .map(|scored| Citation {
            url: normalize_url(&scored.record.url),
            text: scored.record.title.clone(),
        })
        .collect()
}

/// Rewrites the relative-path artifact `#/../` of course-page links to `#/`.
/// Any other URL passes through unchanged.
pub fn normalize_url(url: &str) -> String {
    url.replace("#/../", "#/")
}
