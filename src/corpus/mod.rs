//! Corpus data model.
//!
//! Parent documents arrive as JSON snapshots written by the acquisition
//! crawlers (forum topics and course pages). They are consumed exactly once
//! by the normalizer; the corpus is append-only, so re-runs only pick up
//! documents whose chunks were not indexed before.

mod chunker;
mod normalizer;

pub use chunker::{Chunker, HfTokenCodec, TokenCodec};
pub use normalizer::DocumentNormalizer;

#[cfg(test)]
pub(crate) use chunker::test_codec;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

/// Origin of a chunk's parent document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Forum,
    Course,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Forum => "forum",
            Source::Course => "course",
        }
    }
}

impl std::str::FromStr for Source {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forum" => Ok(Source::Forum),
            "course" => Ok(Source::Course),
            other => Err(ApiError::Internal(format!("unknown source: {}", other))),
        }
    }
}

/// The unit of indexing and retrieval.
///
/// `id` is a deterministic function of (source, parent id, chunk ordinal),
/// which makes repeated indexing runs idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub source: Source,
    /// Display title of the parent document.
    pub title: String,
    /// Canonical link to the parent document.
    pub url: String,
    /// Token-bounded text window.
    pub content: String,
}

/// A forum topic: title plus the ordered post texts, as emitted by the
/// forum crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTopic {
    pub topic_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub posts: Vec<String>,
}

/// A course page extracted by the course-site crawler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoursePage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub menu_text: String,
    #[serde(default)]
    pub content: String,
}

pub fn load_forum_topics(path: &Path) -> Result<Vec<ForumTopic>, ApiError> {
    load_snapshot(path)
}

pub fn load_course_pages(path: &Path) -> Result<Vec<CoursePage>, ApiError> {
    load_snapshot(path)
}

fn load_snapshot<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, ApiError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ApiError::Internal(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| ApiError::Internal(format!("invalid snapshot {}: {}", path.display(), e)))
}
