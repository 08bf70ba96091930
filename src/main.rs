use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use property_search::api;
use property_search::config::Config;
use property_search::ingest;
use property_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Corpus file: {}", config.data_file.display());
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);

    let state = AppState::new(config.clone())?;
    tracing::info!("Query extractor: {:?}", state.extractor.kind());

    // Index in the background; /search answers 503 until ready.
    let startup_state = state.clone();
    tokio::spawn(async move {
        match ingest::reload(&startup_state).await {
            Ok(count) => tracing::info!("Startup indexing complete: {count} properties"),
            Err(e) => tracing::error!("Startup indexing failed: {e:#}"),
        }
    });

    let app = Router::new()
        .route("/", get(api::properties::health))
        .route("/search", post(api::search::search))
        .route("/properties", get(api::properties::list_properties))
        .route("/properties/{id}", get(api::properties::get_property))
        .route("/reindex", post(api::properties::reindex))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
