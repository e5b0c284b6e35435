//! `vta-index`: batch corpus indexing binary.
//!
//! Usage: `vta-index <forum_topics.json> <course_pages.json>`
//! Both snapshot paths are optional; a missing argument skips that source.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use vta_backend::core::{config::AppConfig, logging};
use vta_backend::corpus::{
    self, Chunker, CoursePage, DocumentNormalizer, ForumTopic, HfTokenCodec,
};
use vta_backend::index::SqliteVectorIndex;
use vta_backend::llm::OpenAiProvider;
use vta_backend::pipeline::Indexer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().map_err(|e| anyhow::anyhow!("{}", e))?;
    logging::init(&config.log_dir);

    let mut args = env::args().skip(1);
    let forum_path = args.next().map(PathBuf::from);
    let course_path = args.next().map(PathBuf::from);

    let topics: Vec<ForumTopic> = match &forum_path {
        Some(path) => corpus::load_forum_topics(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("loading forum snapshot {}", path.display()))?,
        None => Vec::new(),
    };
    let pages: Vec<CoursePage> = match &course_path {
        Some(path) => corpus::load_course_pages(path)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("loading course snapshot {}", path.display()))?,
        None => Vec::new(),
    };

    if topics.is_empty() && pages.is_empty() {
        anyhow::bail!("nothing to index: pass forum and/or course snapshot paths");
    }

    let codec = HfTokenCodec::from_file(&config.tokenizer_path)
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let chunker = Chunker::new(Arc::new(codec), config.max_tokens, config.overlap);
    let normalizer = DocumentNormalizer::new(chunker);

    let index = Arc::new(
        SqliteVectorIndex::open(config.index_db_path.clone())
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    let embedder = Arc::new(OpenAiProvider::new(&config).map_err(|e| anyhow::anyhow!("{}", e))?);

    let indexer = Indexer::new(normalizer, embedder, index, config.index_concurrency);
    let report = indexer.index_corpus(&topics, &pages).await;

    tracing::info!(
        "indexing complete: {} indexed, {} already present, {} failed, {} documents skipped",
        report.indexed,
        report.skipped_existing,
        report.failed,
        report.documents_skipped
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
