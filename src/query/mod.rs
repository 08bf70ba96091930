//! Query understanding: free text → [`StructuredConstraints`].
//!
//! The rule-based extractor in [`rules`] is always available. When the LLM
//! strategy is configured it runs first, and any failure falls back to the
//! rules so callers always get constraints back.

pub mod llm;
pub mod rules;

use crate::config::{ExtractorKind, LlmConfig};
use crate::knowledge::KnowledgeBase;
use crate::models::StructuredConstraints;

/// Runs the configured extraction strategy with the rule-based fallback.
#[derive(Clone)]
pub struct QueryExtractor {
    kind: ExtractorKind,
    client: reqwest::Client,
    llm: LlmConfig,
}

impl QueryExtractor {
    pub fn new(kind: ExtractorKind, client: reqwest::Client, llm: LlmConfig) -> Self {
        Self { kind, client, llm }
    }

    /// Extractor that never leaves the process.
    pub fn rules_only() -> Self {
        Self::new(
            ExtractorKind::Rules,
            reqwest::Client::new(),
            LlmConfig::default(),
        )
    }

    pub fn kind(&self) -> ExtractorKind {
        self.kind
    }

    pub async fn extract(&self, query: &str, kb: &KnowledgeBase) -> StructuredConstraints {
        if self.kind == ExtractorKind::Llm {
            match llm::extract(&self.client, &self.llm, query, kb).await {
                Ok(parsed) => return parsed,
                Err(e) => {
                    tracing::warn!("LLM query extraction failed: {e:#}. Falling back to rules.")
                }
            }
        }
        rules::parse(query, kb)
    }
}
