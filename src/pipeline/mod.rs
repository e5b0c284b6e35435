//! Indexing and answering pipelines.

mod answerer;
mod image;
mod indexer;

pub use answerer::{normalize_url, Answer, Answerer, Citation};
pub use indexer::{IndexReport, Indexer};
