use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::index::{SqliteVectorIndex, VectorIndex};
use crate::llm::{CompletionProvider, EmbeddingProvider, OpenAiProvider};
use crate::pipeline::Answerer;

/// Application state shared across requests.
///
/// Config is immutable after startup; requests share only the index read
/// path and the stateless provider clients.
pub struct AppState {
    pub config: AppConfig,
    pub index: Arc<dyn VectorIndex>,
    pub answerer: Answerer,
}

impl AppState {
    pub async fn initialize(config: AppConfig) -> Result<Arc<Self>, ApiError> {
        let index: Arc<dyn VectorIndex> =
            Arc::new(SqliteVectorIndex::open(config.index_db_path.clone()).await?);

        let provider = Arc::new(OpenAiProvider::new(&config)?);
        let embedder: Arc<dyn EmbeddingProvider> = provider.clone();
        let llm: Arc<dyn CompletionProvider> = provider;

        let answerer = Answerer::new(&config, embedder, llm, index.clone())?;

        Ok(Arc::new(AppState {
            config,
            index,
            answerer,
        }))
    }
}
