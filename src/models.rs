use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point of interest near a listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearbyPlace {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub distance_m: f64,
}

impl NearbyPlace {
    /// Flattened display form, e.g. `school: Green Valley School (250m)`.
    pub fn flattened(&self) -> String {
        format!("{}: {} ({}m)", self.kind, self.name, self.distance_m as i64)
    }
}

/// A listing from the corpus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub address: Option<String>,
    pub neighborhood: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub area_sqft: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub nearby_places: Vec<NearbyPlace>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Structured constraints extracted from a free-text query
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StructuredConstraints {
    pub original_query: String,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub bedrooms: Option<u32>,
    /// Minimum number of bathrooms
    pub bathrooms: Option<u32>,
    pub property_type: Option<String>,
    pub locations: Vec<String>,
    pub amenities: Vec<String>,
    pub preferences: Vec<String>,
}

impl StructuredConstraints {
    pub fn empty(query: &str) -> Self {
        Self {
            original_query: query.to_string(),
            ..Self::default()
        }
    }

    pub fn has_budget(&self) -> bool {
        self.budget_min.is_some() || self.budget_max.is_some()
    }

    /// A minimum above the maximum is contradictory: both bounds are dropped.
    pub fn discard_contradictory_budget(&mut self) {
        if let (Some(min), Some(max)) = (self.budget_min, self.budget_max) {
            if min > max {
                tracing::info!("Discarding contradictory budget: min {min} > max {max}");
                self.budget_min = None;
                self.budget_max = None;
            }
        }
    }
}

/// A listing returned by semantic retrieval
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub vector_score: f32,
    pub property: Property,
}

/// Displayable projection of a listing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResultMetadata {
    pub price: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub neighborhood: String,
    pub address: Option<String>,
    pub area_sqft: u32,
    pub amenities: Vec<String>,
    pub nearby_places: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl From<&Property> for ResultMetadata {
    fn from(p: &Property) -> Self {
        Self {
            price: p.price,
            bedrooms: p.bedrooms,
            bathrooms: p.bathrooms,
            neighborhood: p.neighborhood.clone(),
            address: p.address.clone(),
            area_sqft: p.area_sqft,
            amenities: p.amenities.clone(),
            nearby_places: p.nearby_places.iter().map(NearbyPlace::flattened).collect(),
            property_type: p.property_type.clone().filter(|t| !t.is_empty()),
            city: p.city.clone().filter(|c| !c.is_empty()),
        }
    }
}

/// A ranked, explained search result
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub property_id: String,
    pub title: String,
    /// Similarity plus boosts, clamped to 1.0
    pub relevance_score: f64,
    /// Raw cosine similarity from the vector index
    pub vector_score: f64,
    pub explanation: String,
    pub metadata: ResultMetadata,
}

/// Search request
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Range-checked by the handler
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

fn default_top_k() -> i64 {
    10
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub parsed_query: StructuredConstraints,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub total_properties: usize,
    pub index_ready: bool,
    pub indexed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReindexResponse {
    pub status: String,
    pub properties_indexed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearby_place_deserializes_type_field() {
        let json = r#"{"type": "school", "name": "Oak School", "distance_m": 250.7}"#;
        let place: NearbyPlace = serde_json::from_str(json).unwrap();
        assert_eq!(place.kind, "school");
        assert_eq!(place.flattened(), "school: Oak School (250m)");
    }

    #[test]
    fn test_contradictory_budget_is_discarded() {
        let mut c = StructuredConstraints {
            budget_min: Some(50_000.0),
            budget_max: Some(40_000.0),
            ..StructuredConstraints::empty("q")
        };
        c.discard_contradictory_budget();
        assert_eq!(c.budget_min, None);
        assert_eq!(c.budget_max, None);
    }

    #[test]
    fn test_consistent_budget_is_kept() {
        let mut c = StructuredConstraints {
            budget_min: Some(20_000.0),
            budget_max: Some(40_000.0),
            ..StructuredConstraints::empty("q")
        };
        c.discard_contradictory_budget();
        assert_eq!(c.budget_min, Some(20_000.0));
        assert_eq!(c.budget_max, Some(40_000.0));
    }

    #[test]
    fn test_metadata_omits_empty_optional_fields() {
        let property = Property {
            id: "p1".to_string(),
            title: "Flat".to_string(),
            description: String::new(),
            address: None,
            neighborhood: "Pine Street".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            price: 30_000.0,
            bedrooms: 2,
            bathrooms: 1,
            area_sqft: 900,
            amenities: vec![],
            nearby_places: vec![],
            property_type: Some(String::new()),
            city: None,
        };
        let json = serde_json::to_value(ResultMetadata::from(&property)).unwrap();
        assert!(json.get("property_type").is_none());
        assert!(json.get("city").is_none());
        assert_eq!(json["bedrooms"], 2);
    }
}
