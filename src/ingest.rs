//! Corpus loading and (re)indexing.

use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::knowledge::KnowledgeBase;
use crate::models::Property;
use crate::state::AppState;

/// Read a JSON array of listings.
pub fn load_properties(path: &Path) -> Result<Vec<Property>> {
    tracing::info!("Loading properties from {}", path.display());
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let properties: Vec<Property> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse listings in {}", path.display()))?;
    tracing::info!("Loaded {} properties", properties.len());
    Ok(properties)
}

/// Text embedded for a listing: title, description, location, sizes, price,
/// amenities and nearby places, separated by ` . `.
pub fn embedding_text(p: &Property) -> String {
    let mut parts = vec![p.title.clone(), p.description.clone()];

    let mut location = Vec::new();
    if let Some(address) = p.address.as_deref().filter(|a| !a.is_empty()) {
        location.push(address);
    }
    location.push(p.neighborhood.as_str());
    if let Some(city) = p.city.as_deref().filter(|c| !c.is_empty()) {
        location.push(city);
    }
    parts.push(format!("Located in {}", location.join(", ")));

    parts.push(format!("{} bedrooms, {} bathrooms", p.bedrooms, p.bathrooms));
    if let Some(kind) = p.property_type.as_deref().filter(|t| !t.is_empty()) {
        parts.push(format!("{kind} property"));
    }
    parts.push(format!("Price: {}", p.price));
    parts.push(format!("Area: {} sqft", p.area_sqft));

    if !p.amenities.is_empty() {
        parts.push(format!("Amenities: {}", p.amenities.join(", ")));
    }
    if !p.nearby_places.is_empty() {
        let nearby: Vec<String> = p
            .nearby_places
            .iter()
            .map(|place| {
                format!(
                    "{} ({}, {}m away)",
                    place.name, place.kind, place.distance_m as i64
                )
            })
            .collect();
        parts.push(format!("Nearby: {}", nearby.join(", ")));
    }

    parts.join(" . ")
}

/// Distinct vocabulary observed in the corpus.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CorpusVocabulary {
    pub cities: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub amenities: Vec<String>,
    pub nearby_types: Vec<String>,
}

impl CorpusVocabulary {
    pub fn from_properties(properties: &[Property]) -> Self {
        let mut cities = BTreeSet::new();
        let mut neighborhoods = BTreeSet::new();
        let mut amenities = BTreeSet::new();
        let mut nearby_types = BTreeSet::new();

        for p in properties {
            if let Some(city) = p.city.as_ref().filter(|c| !c.is_empty()) {
                cities.insert(city.clone());
            }
            neighborhoods.insert(p.neighborhood.clone());
            amenities.extend(p.amenities.iter().cloned());
            nearby_types.extend(p.nearby_places.iter().map(|n| n.kind.clone()));
        }

        Self {
            cities: cities.into_iter().collect(),
            neighborhoods: neighborhoods.into_iter().collect(),
            amenities: amenities.into_iter().collect(),
            nearby_types: nearby_types.into_iter().collect(),
        }
    }

    pub fn knowledge_base(&self) -> KnowledgeBase {
        KnowledgeBase::register(
            &self.cities,
            &self.neighborhoods,
            &self.amenities,
            &self.nearby_types,
        )
    }
}

/// Embed every listing, then install the new vector collection, vocabulary
/// and property cache back to back. Returns the number of indexed listings.
/// If embedding fails the previous index and vocabulary stay in place.
pub async fn ingest(state: &AppState, properties: Vec<Property>) -> Result<usize> {
    let knowledge = CorpusVocabulary::from_properties(&properties).knowledge_base();

    tracing::info!("Generating embeddings for {} properties...", properties.len());
    let texts: Vec<String> = properties.iter().map(embedding_text).collect();
    let llm_config = state.llm_config();
    let embeddings = crate::llm::embeddings::embed_batch(&state.http_client, &llm_config, &texts)
        .await
        .context("Failed to embed listings")?;
    if embeddings.is_empty() {
        anyhow::bail!("No embeddings generated, dataset may be empty");
    }

    let items = properties
        .iter()
        .zip(embeddings)
        .map(|(p, embedding)| (p.id.clone(), embedding, p.clone()))
        .collect();
    let count = state.vectors.replace(llm_config.embedding_dim, items)?;
    state.knowledge.replace(knowledge);
    *state.properties.write() = Arc::new(properties);
    *state.indexed_at.write() = Some(Utc::now());

    tracing::info!("Ingestion complete: {count} properties indexed");
    Ok(count)
}

/// Load the configured corpus and ingest it. Reloads are serialized; the
/// current index keeps serving until the new one is installed, and the
/// ready flag is raised after the first successful load.
pub async fn reload(state: &AppState) -> Result<usize> {
    let _permit = state
        .reindex_semaphore
        .acquire()
        .await
        .context("Reindex gate closed")?;

    let properties = load_properties(&state.config.data_file)?;
    let count = ingest(state, properties).await?;
    state.set_ready(true);
    Ok(count)
}
