//! Candidate retrieval and ranking.
//!
//! ```text
//!  query vector ──▶ retriever (top-N by cosine) ──▶ hard filters
//!                                                       │
//!  constraints ───────────────────────────────────▶ boosts ──▶ sort ──▶ explain
//! ```

pub mod ranking;
pub mod retriever;
pub mod vector;

use crate::models::{SearchResult, StructuredConstraints};
use retriever::CandidateSource;

/// Default number of semantic candidates pulled before filtering.
pub const DEFAULT_POOL_SIZE: usize = 50;

/// Retrieve a candidate pool for `query_vector` and rank it against
/// `constraints`. Retrieval failures yield an empty result list.
pub fn search(
    source: &dyn CandidateSource,
    constraints: &StructuredConstraints,
    query_vector: &[f32],
    pool_size: usize,
    top_k: usize,
) -> Vec<SearchResult> {
    let pool = retriever::retrieve(source, query_vector, pool_size);
    tracing::info!("Vector search returned {} candidates", pool.len());
    if pool.is_empty() {
        return Vec::new();
    }
    ranking::rank(constraints, pool, top_k)
}
