//! VectorIndex trait — abstract interface over the persisted vector store.

use async_trait::async_trait;

use crate::core::errors::ApiError;
use crate::corpus::ChunkRecord;

/// A retrieved chunk with its distance to the query vector.
///
/// Distance is cosine distance (1 - cosine similarity): lower is closer.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub record: ChunkRecord,
    pub distance: f32,
}

/// Nearest-neighbor store over chunk embeddings plus metadata.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert a chunk with its embedding. Insert-if-absent: an existing id
    /// is left untouched (never overwritten), which makes re-indexing an
    /// append-only corpus idempotent. Returns whether a row was inserted.
    async fn upsert(&self, record: ChunkRecord, embedding: Vec<f32>) -> Result<bool, ApiError>;

    /// Return up to `k` chunks ordered by ascending distance to the query
    /// embedding. Ties break by insertion order.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>, ApiError>;

    /// Total number of indexed entries.
    async fn count(&self) -> Result<usize, ApiError>;
}
