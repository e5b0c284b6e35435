//! Batch indexing pipeline.
//!
//! Normalizes parent documents into chunk records, embeds each chunk, and
//! upserts it into the vector index. Embedding and upserting run
//! concurrently up to a bounded limit; failures are isolated per document
//! (acquisition gaps) or per chunk (embedding/index errors) and never abort
//! the batch.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use serde::Serialize;

use crate::core::errors::ApiError;
use crate::corpus::{ChunkRecord, CoursePage, DocumentNormalizer, ForumTopic};
use crate::index::VectorIndex;
use crate::llm::EmbeddingProvider;

/// Outcome counters for one indexing run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct IndexReport {
    /// Chunks newly inserted into the index.
    pub indexed: usize,
    /// Chunks whose id was already present (idempotent re-run).
    pub skipped_existing: usize,
    /// Chunks dropped after an embedding or index failure.
    pub failed: usize,
    /// Parent documents skipped for missing required fields.
    pub documents_skipped: usize,
}

pub struct Indexer {
    normalizer: DocumentNormalizer,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    concurrency: usize,
}

impl Indexer {
    pub fn new(
        normalizer: DocumentNormalizer,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        concurrency: usize,
    ) -> Self {
        Self {
            normalizer,
            embedder,
            index,
            concurrency: concurrency.max(1),
        }
    }

    /// Indexes a corpus snapshot. Chunk ids are deterministic, so re-running
    /// over the same snapshot only counts `skipped_existing`.
    pub async fn index_corpus(&self, topics: &[ForumTopic], pages: &[CoursePage]) -> IndexReport {
        let mut report = IndexReport::default();
        let mut records: Vec<ChunkRecord> = Vec::new();

        for topic in topics {
            match self.normalizer.normalize_topic(topic) {
                Ok(chunks) => records.extend(chunks),
                Err(err) => {
                    tracing::warn!("skipping forum topic {}: {}", topic.topic_id, err);
                    report.documents_skipped += 1;
                }
            }
        }
        for page in pages {
            match self.normalizer.normalize_page(page) {
                Ok(chunks) => records.extend(chunks),
                Err(err) => {
                    tracing::warn!("skipping course page '{}': {}", page.menu_text, err);
                    report.documents_skipped += 1;
                }
            }
        }

        // Chunk ids within one run are distinct, and the index's
        // insert-if-absent is atomic, so concurrent upserts cannot race.
        let outcomes = stream::iter(records)
            .map(|record| {
                let embedder = self.embedder.clone();
                let index = self.index.clone();
                async move {
                    let id = record.id.clone();
                    match Self::embed_and_upsert(embedder, index, record).await {
                        Ok(inserted) => Ok(inserted),
                        Err(err) => {
                            tracing::warn!("failed to index chunk {}: {}", id, err);
                            Err(err)
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        for outcome in outcomes {
            match outcome {
                Ok(true) => report.indexed += 1,
                Ok(false) => report.skipped_existing += 1,
                Err(_) => report.failed += 1,
            }
        }

        report
    }

    async fn embed_and_upsert(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        record: ChunkRecord,
    ) -> Result<bool, ApiError> {
        let embedding = embedder.embed(&record.content).await?;
        index.upsert(record, embedding).await
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::corpus::test_codec::CharCodec;
    use crate::corpus::Chunker;
    use crate::index::SqliteVectorIndex;

    /// Deterministic embedder: vector derived from content length.
    struct HashEmbedder;

    #[async_trait]
    impl EmbeddingProvider for HashEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, ApiError> {
            let len = text.len() as f32;
            Ok(vec![len, 1.0])
        }
    }

    /// Fails on every call; the batch must survive it.
    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, ApiError> {
            Err(ApiError::Embedding("provider down".into()))
        }
    }

    fn sample_topics() -> Vec<ForumTopic> {
        vec![
            ForumTopic {
                topic_id: 101,
                title: "Docker help".into(),
                url: "https://forum.example/t/docker-help/101".into(),
                posts: vec!["How do I build?".into(), "Use docker build .".into()],
            },
            ForumTopic {
                topic_id: 102,
                title: "Deadline question".into(),
                url: "https://forum.example/t/deadline-question/102".into(),
                posts: vec!["When is project 1 due?".into()],
            },
        ]
    }

    fn sample_pages() -> Vec<CoursePage> {
        vec![CoursePage {
            url: "https://course.example/#/../docker".into(),
            title: "Docker - Course".into(),
            menu_text: "Docker".into(),
            content: "Containers package applications.".into(),
        }]
    }

    async fn indexer_with(
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> (tempfile::TempDir, Arc<SqliteVectorIndex>, Indexer) {
        let dir = tempfile::tempdir().unwrap();
        let index = Arc::new(
            SqliteVectorIndex::open(dir.path().join("index.db"))
                .await
                .unwrap(),
        );
        let normalizer = DocumentNormalizer::new(Chunker::new(Arc::new(CharCodec), 500, 50));
        let indexer = Indexer::new(normalizer, embedder, index.clone(), 4);
        (dir, index, indexer)
    }

    #[tokio::test]
    async fn corpus_of_three_documents_yields_three_entries() {
        let (_dir, index, indexer) = indexer_with(Arc::new(HashEmbedder)).await;

        let report = indexer
            .index_corpus(&sample_topics(), &sample_pages())
            .await;

        assert_eq!(report.indexed, 3);
        assert_eq!(report.failed, 0);
        assert_eq!(report.documents_skipped, 0);
        assert_eq!(index.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn reindexing_the_same_corpus_adds_nothing() {
        let (_dir, index, indexer) = indexer_with(Arc::new(HashEmbedder)).await;

        indexer
            .index_corpus(&sample_topics(), &sample_pages())
            .await;
        let second = indexer
            .index_corpus(&sample_topics(), &sample_pages())
            .await;

        assert_eq!(second.indexed, 0);
        assert_eq!(second.skipped_existing, 3);
        assert_eq!(index.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn embedding_failures_do_not_abort_the_batch() {
        let (_dir, index, indexer) = indexer_with(Arc::new(BrokenEmbedder)).await;

        let report = indexer
            .index_corpus(&sample_topics(), &sample_pages())
            .await;

        assert_eq!(report.indexed, 0);
        assert_eq!(report.failed, 3);
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn documents_with_gaps_are_skipped_not_fatal() {
        let (_dir, index, indexer) = indexer_with(Arc::new(HashEmbedder)).await;

        let mut topics = sample_topics();
        topics[0].posts.clear();

        let report = indexer.index_corpus(&topics, &sample_pages()).await;

        assert_eq!(report.documents_skipped, 1);
        assert_eq!(report.indexed, 2);
        assert_eq!(index.count().await.unwrap(), 2);
    }
}
