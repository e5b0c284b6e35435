//! SQLite-backed vector index.
//!
//! Metadata lives in a documents table; embeddings are stored as
//! little-endian f32 BLOBs and scanned brute-force with cosine distance.
//! `INSERT OR IGNORE` gives the insert-if-absent contract atomically, so
//! concurrent indexing workers never race on the same chunk id.

use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{ScoredChunk, VectorIndex};
use crate::core::errors::ApiError;
use crate::corpus::{ChunkRecord, Source};

pub struct SqliteVectorIndex {
    pool: SqlitePool,
}

impl SqliteVectorIndex {
    pub async fn open(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::index)?;

        let index = Self { pool };
        index.init_schema().await?;
        Ok(index)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::index)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 1.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            1.0
        } else {
            1.0 - dot / denom
        }
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<ChunkRecord, ApiError> {
        let source_str: String = row.get("source");
        Ok(ChunkRecord {
            id: row.get("id"),
            source: Source::from_str(&source_str)?,
            title: row.get("title"),
            url: row.get("url"),
            content: row.get("content"),
        })
    }
}

#[async_trait]
impl VectorIndex for SqliteVectorIndex {
    async fn upsert(&self, record: ChunkRecord, embedding: Vec<f32>) -> Result<bool, ApiError> {
        let blob = Self::serialize_embedding(&embedding);

        let result = sqlx::query(
            "INSERT OR IGNORE INTO documents (id, source, title, url, content, embedding)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&record.id)
        .bind(record.source.as_str())
        .bind(&record.title)
        .bind(&record.url)
        .bind(&record.content)
        .bind(&blob)
        .execute(&self.pool)
        .await
        .map_err(ApiError::index)?;

        Ok(result.rows_affected() > 0)
    }

    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<ScoredChunk>, ApiError> {
        let rows = sqlx::query(
            "SELECT rowid, id, source, title, url, content, embedding
             FROM documents
             ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::index)?;

        let mut scored: Vec<(i64, ScoredChunk)> = Vec::with_capacity(rows.len());
        for row in &rows {
            let rowid: i64 = row.get("rowid");
            let bytes: Vec<u8> = row.get("embedding");
            let stored = Self::deserialize_embedding(&bytes);
            scored.push((
                rowid,
                ScoredChunk {
                    record: Self::row_to_record(row)?,
                    distance: Self::cosine_distance(embedding, &stored),
                },
            ));
        }

        // Ascending distance; rowid (insertion order) breaks ties so test
        // runs are deterministic.
        scored.sort_by(|(a_row, a), (b_row, b)| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a_row.cmp(b_row))
        });
        scored.truncate(k);

        Ok(scored.into_iter().map(|(_, chunk)| chunk).collect())
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::index)?;

        Ok(count as usize)
    }
}
