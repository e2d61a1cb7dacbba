//! Process configuration from `.env` and environment variables.

use std::path::PathBuf;

use book_agent::AgentConfig;
use book_rag::RagConfig;
use book_rag::gemini::DEFAULT_EMBEDDING_MODEL;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_CORPUS_DIR: &str = ".";
pub const DEFAULT_CONTENT_DIR: &str = "../book_content";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY not found in environment (GOOGLE_API_KEY is also accepted)")]
    MissingApiKey,

    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),

    #[error("invalid {key} value '{value}'")]
    InvalidNumber { key: String, value: String },

    #[error("invalid retrieval settings: {0}")]
    Retrieval(String),
}

/// Everything the binaries read from the environment.
#[derive(Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Directory holding `embeddings.npy` and `metadata.json`.
    pub corpus_dir: PathBuf,
    /// Directory of chapter markdown files, read by `build-corpus`.
    pub content_dir: PathBuf,
    pub model: String,
    pub embedding_model: String,
    /// Chunk window for `build-corpus` and passages per search.
    pub rag: RagConfig,
    api_key: Option<String>,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let number = |key: &str, default: usize| match var(key) {
            Some(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidNumber { key: key.to_string(), value: raw }),
            None => Ok(default),
        };
        let defaults = RagConfig::default();
        let rag = RagConfig::builder()
            .chunk_size(number("BOOK_CHUNK_SIZE", defaults.chunk_size)?)
            .chunk_overlap(number("BOOK_CHUNK_OVERLAP", defaults.chunk_overlap)?)
            .top_k(number("BOOK_SEARCH_TOP_K", defaults.top_k)?)
            .build()
            .map_err(|e| ConfigError::Retrieval(e.to_string()))?;

        Ok(Self {
            host: var("BOOK_AGENT_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            corpus_dir: var("BOOK_CORPUS_DIR").unwrap_or_else(|| DEFAULT_CORPUS_DIR.into()).into(),
            content_dir: var("BOOK_CONTENT_DIR").unwrap_or_else(|| DEFAULT_CONTENT_DIR.into()).into(),
            model: var("BOOK_AGENT_MODEL").unwrap_or_else(|| book_agent::config::DEFAULT_MODEL.into()),
            embedding_model: var("BOOK_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into()),
            rag,
            api_key: var("GEMINI_API_KEY").or_else(|| var("GOOGLE_API_KEY")),
        })
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig::default().with_model(self.model.clone())
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("corpus_dir", &self.corpus_dir)
            .field("content_dir", &self.content_dir)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("rag", &self.rag)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
