use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding the listing corpus
    pub data_file: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Size of the semantic candidate pool fetched per search
    pub candidate_pool: usize,
    /// Which query extractor to run first
    pub extractor: ExtractorKind,
    /// LLM provider configuration (embeddings and the LLM extractor)
    pub llm: LlmConfig,
}

/// Query extraction strategy. `Rules` is always the final fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    Rules,
    Llm,
}

impl ExtractorKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "rules" | "regex" => Some(Self::Rules),
            "llm" => Some(Self::Llm),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for query extraction
    pub chat_model: String,
    /// Model name for embeddings
    pub embedding_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Embedding vector dimension
    pub embedding_dim: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("./data/properties.json"),
            bind_addr: "127.0.0.1:8000".to_string(),
            candidate_pool: 50,
            extractor: ExtractorKind::Rules,
            llm: LlmConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            embedding_model: "all-minilm".to_string(),
            api_key: None,
            embedding_dim: 384,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("PROPERTY_SEARCH_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }
        if let Ok(addr) = std::env::var("PROPERTY_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(val) = std::env::var("PROPERTY_SEARCH_CANDIDATES") {
            if let Ok(v) = val.parse::<usize>() {
                config.candidate_pool = v.max(1);
            }
        }
        if let Ok(name) = std::env::var("QUERY_EXTRACTOR") {
            match ExtractorKind::from_name(&name) {
                Some(kind) => config.extractor = kind,
                None => tracing::warn!("Unknown QUERY_EXTRACTOR '{name}', using rules"),
            }
        }
        if let Ok(provider) = std::env::var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Ok(url) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Ok(model) = std::env::var("LLM_EMBEDDING_MODEL") {
            config.llm.embedding_model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(dim) = std::env::var("LLM_EMBEDDING_DIM") {
            if let Ok(d) = dim.parse() {
                config.llm.embedding_dim = d;
            }
        }

        config
    }
}
