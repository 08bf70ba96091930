use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::models::{SearchRequest, SearchResponse};
use crate::search::ranking::MAX_TOP_K;
use crate::state::AppState;

/// POST /search - Natural-language property search:
///   1. Extract structured constraints (LLM if configured, rules otherwise)
///   2. Embed the query and pull the semantic candidate pool
///   3. Hard-filter, boost, rank and explain
pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let Json(req) = payload.map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
    let (query, top_k) = validate(&req)?;
    if !state.is_ready() {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "Search index is not ready yet".to_string(),
        ));
    }

    tracing::info!("Search query: '{query}'");

    let knowledge = state.knowledge.snapshot();
    let parsed_query = state.extractor.extract(&query, &knowledge).await;

    let llm_config = state.llm_config();
    let results =
        match crate::llm::embeddings::embed_single(&state.http_client, &llm_config, &query).await {
            Ok(query_embedding) => crate::search::search(
                state.vectors.as_ref(),
                &parsed_query,
                &query_embedding,
                state.config.candidate_pool,
                top_k,
            ),
            Err(e) => {
                tracing::error!("Query embedding failed, returning no candidates: {e:#}");
                Vec::new()
            }
        };

    Ok(Json(SearchResponse {
        query,
        parsed_query,
        total_results: results.len(),
        results,
    }))
}

/// Trimmed query and result count, or a 400.
fn validate(req: &SearchRequest) -> Result<(String, usize), (StatusCode, String)> {
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Query is required".to_string()));
    }
    match usize::try_from(req.top_k) {
        Ok(top_k) if (1..=MAX_TOP_K).contains(&top_k) => Ok((query, top_k)),
        _ => Err((
            StatusCode::BAD_REQUEST,
            format!("top_k must be between 1 and {MAX_TOP_K}"),
        )),
    }
}
