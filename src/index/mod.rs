//! Vector index over chunk embeddings.

mod sqlite;
mod store;

pub use sqlite::SqliteVectorIndex;
pub use store::{ScoredChunk, VectorIndex};
