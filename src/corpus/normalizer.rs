//! Document normalizer.
//!
//! Converts source-specific parent documents into uniform chunk records.
//! Pure computation: no network or storage access happens here.

use super::{ChunkRecord, Chunker, CoursePage, ForumTopic, Source};
use crate::core::errors::ApiError;

pub struct DocumentNormalizer {
    chunker: Chunker,
}

impl DocumentNormalizer {
    pub fn new(chunker: Chunker) -> Self {
        Self { chunker }
    }

    /// Forum topics chunk the title-prefixed post text, so the title biases
    /// every chunk's embedding toward topical relevance.
    ///
    /// Ids are `forum-{topic_id}-{ordinal}`; re-running over the same topic
    /// yields identical ids.
    pub fn normalize_topic(&self, topic: &ForumTopic) -> Result<Vec<ChunkRecord>, ApiError> {
        if topic.title.trim().is_empty() {
            return Err(ApiError::AcquisitionGap(format!(
                "forum topic {} has no title",
                topic.topic_id
            )));
        }
        if topic.posts.is_empty() {
            return Err(ApiError::AcquisitionGap(format!(
                "forum topic {} has no posts",
                topic.topic_id
            )));
        }

        let full_text = format!("{}\n{}", topic.title, topic.posts.join("\n"));
        let chunks = self.chunker.chunk(&full_text)?;

        Ok(chunks
            .into_iter()
            .enumerate()
            .map(|(i, content)| ChunkRecord {
                id: format!("forum-{}-{}", topic.topic_id, i),
                source: Source::Forum,
                title: topic.title.clone(),
                url: topic.url.clone(),
                content,
            })
            .collect())
    }

    /// Course pages chunk the extracted body text. Ids are
    /// `course-{slug}-{ordinal}` where the slug is the sidebar menu text
    /// with spaces replaced by underscores.
    pub fn normalize_page(&self, page: &CoursePage) -> Result<Vec<ChunkRecord>, ApiError> {
        if page.menu_text.trim().is_empty() {
            return Err(ApiError::AcquisitionGap(format!(
                "course page {} has no menu text",
                page.url
            )));
        }
        if page.url.trim().is_empty() {
            return Err(ApiError::AcquisitionGap(format!(
                "course page '{}' has no url",
                page.menu_text
            )));
        }

        let slug = slugify(&page.menu_text);
        let chunks = self.chunker.chunk(&page.content)?;

        Ok(chunks
            .into_iter()
            .enumerate()
            .map(|(i, content)| ChunkRecord {
                id: format!("course-{}-{}", slug, i),
                source: Source::Course,
                title: page.menu_text.clone(),
                url: page.url.clone(),
                content,
            })
            .collect())
    }
}

fn slugify(menu_text: &str) -> String {
    menu_text.trim().replace(' ', "_")
}
