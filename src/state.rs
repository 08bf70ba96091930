use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{Config, LlmConfig};
use crate::knowledge::KnowledgeHandle;
use crate::models::Property;
use crate::query::QueryExtractor;
use crate::search::vector::VectorStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub knowledge: KnowledgeHandle,
    pub vectors: Arc<VectorStore>,
    pub properties: Arc<RwLock<Arc<Vec<Property>>>>,
    pub indexed_at: Arc<RwLock<Option<DateTime<Utc>>>>,
    pub extractor: QueryExtractor,
    pub http_client: reqwest::Client,
    /// Single permit: one corpus reload at a time
    pub reindex_semaphore: Arc<tokio::sync::Semaphore>,
    index_ready: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        let extractor =
            QueryExtractor::new(config.extractor, http_client.clone(), config.llm.clone());
        let vectors = VectorStore::new(config.llm.embedding_dim);

        Ok(Self {
            config,
            knowledge: KnowledgeHandle::default(),
            vectors: Arc::new(vectors),
            properties: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            indexed_at: Arc::new(RwLock::new(None)),
            extractor,
            http_client,
            reindex_semaphore: Arc::new(tokio::sync::Semaphore::new(1)),
            index_ready: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn llm_config(&self) -> LlmConfig {
        self.config.llm.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.index_ready.load(Ordering::Acquire)
    }

    pub fn set_ready(&self, ready: bool) {
        self.index_ready.store(ready, Ordering::Release);
    }

    /// Current listing snapshot.
    pub fn properties(&self) -> Arc<Vec<Property>> {
        self.properties.read().clone()
    }
}
