use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::{HealthResponse, Property, ReindexResponse};
use crate::state::AppState;

/// GET / - Service health and index status
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let ready = state.is_ready();
    Json(HealthResponse {
        status: if ready { "healthy" } else { "initializing" }.to_string(),
        total_properties: state.properties().len(),
        index_ready: ready,
        indexed_at: *state.indexed_at.read(),
    })
}

/// GET /properties - All loaded listings
pub async fn list_properties(State(state): State<AppState>) -> Json<Vec<Property>> {
    Json(state.properties().as_ref().clone())
}

/// GET /properties/{id} - A single listing
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>, (StatusCode, String)> {
    state
        .properties()
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Property '{id}' not found")))
}

/// POST /reindex - Reload the corpus and rebuild the index
pub async fn reindex(
    State(state): State<AppState>,
) -> Result<Json<ReindexResponse>, (StatusCode, String)> {
    match crate::ingest::reload(&state).await {
        Ok(count) => Ok(Json(ReindexResponse {
            status: "success".to_string(),
            properties_indexed: count,
        })),
        Err(e) => {
            tracing::error!("Reindex failed: {e:#}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))
        }
    }
}
