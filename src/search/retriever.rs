use anyhow::Result;

use crate::models::Candidate;
use crate::search::vector::{VectorHit, VectorStore};

/// Anything that can answer nearest-neighbour queries with listing payloads.
pub trait CandidateSource: Send + Sync {
    fn nearest(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>>;
}

impl CandidateSource for VectorStore {
    fn nearest(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        self.query(query_embedding, limit)
    }
}

/// Fetch the similarity-ordered candidate pool. Index errors are logged and
/// produce an empty pool.
pub fn retrieve(source: &dyn CandidateSource, query_embedding: &[f32], limit: usize) -> Vec<Candidate> {
    match source.nearest(query_embedding, limit) {
        Ok(hits) => hits
            .into_iter()
            .map(|hit| Candidate {
                id: hit.id,
                vector_score: hit.score,
                property: hit.payload,
            })
            .collect(),
        Err(e) => {
            tracing::error!("Vector search failed: {e:#}");
            Vec::new()
        }
    }
}
