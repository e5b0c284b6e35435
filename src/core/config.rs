//! Immutable application configuration.
//!
//! Loaded once at startup from a YAML file (path overridable via
//! `VTA_CONFIG_PATH`), with secrets taken from the environment. Components
//! receive the config by reference at construction; nothing reloads it.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::ApiError;

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// OpenAI-compatible API base, e.g. an AI Pipe or LM Studio endpoint.
    pub api_base_url: String,
    /// Bearer token for the provider. Overridden by `VTA_API_KEY`.
    pub api_key: Option<String>,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Chat completion model identifier.
    pub completion_model: String,
    /// Chunk window size in tokens.
    pub max_tokens: usize,
    /// Token overlap between consecutive chunks.
    pub overlap: usize,
    /// Number of chunks retrieved per question.
    pub top_k: usize,
    /// Path to a HuggingFace `tokenizer.json` used by the chunker.
    pub tokenizer_path: PathBuf,
    /// SQLite file backing the vector index.
    pub index_db_path: PathBuf,
    /// Directory for rolling log files.
    pub log_dir: PathBuf,
    /// Timeout applied to every outbound call (embed, complete, image fetch).
    pub request_timeout_secs: u64,
    /// Bounded concurrency for the indexing pipeline.
    pub index_concurrency: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://aipipe.org/openai/v1".to_string(),
            api_key: None,
            embedding_model: "text-embedding-3-small".to_string(),
            completion_model: "gpt-4o".to_string(),
            max_tokens: 500,
            overlap: 50,
            top_k: 5,
            tokenizer_path: PathBuf::from("tokenizer.json"),
            index_db_path: PathBuf::from("vta-index.db"),
            log_dir: PathBuf::from("logs"),
            request_timeout_secs: 30,
            index_concurrency: 8,
        }
    }
}

impl AppConfig {
    /// Loads the config file if present, otherwise defaults, then applies
    /// environment overrides.
    pub fn load() -> Result<Self, ApiError> {
        let path = env::var("VTA_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };

        if let Ok(key) = env::var("VTA_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ApiError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Internal(format!("failed to read {}: {}", path.display(), e)))?;
        serde_yaml::from_str(&raw)
            .map_err(|e| ApiError::Internal(format!("invalid config {}: {}", path.display(), e)))
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.max_tokens == 0 {
            return Err(ApiError::BadRequest("max_tokens must be positive".into()));
        }
        if self.overlap >= self.max_tokens {
            return Err(ApiError::BadRequest(
                "overlap must be smaller than max_tokens".into(),
            ));
        }
        if self.top_k == 0 {
            return Err(ApiError::BadRequest("top_k must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.overlap, 50);
        assert_eq!(config.top_k, 5);
    }

    #[test]
    fn rejects_overlap_not_smaller_than_window() {
        let config = AppConfig {
            max_tokens: 50,
            overlap: 50,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_partial_yaml_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "max_tokens: 128\noverlap: 16\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.max_tokens, 128);
        assert_eq!(config.overlap, 16);
        assert_eq!(config.top_k, 5);
    }
}
