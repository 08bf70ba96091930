//! Lexical knowledge base: the domain vocabulary the query extractor matches
//! against. Built once per corpus load and swapped in wholesale.

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Amenity vocabulary known regardless of what the corpus contains.
pub const DEFAULT_AMENITIES: &[&str] = &[
    "parking",
    "gym",
    "swimming pool",
    "pool",
    "garden",
    "security",
    "lift",
    "elevator",
    "power backup",
    "furnished",
    "ac",
    "air conditioning",
    "wi-fi",
    "wifi",
    "internet",
    "clubhouse",
    "concierge",
    "terrace",
    "balcony",
    "fireplace",
    "smart home",
    "home office",
    "co-working",
    "coworking",
    "laundry",
    "housekeeping",
    "pet friendly",
    "pet_friendly",
    "barbecue",
    "jogging track",
    "children play area",
    "play area",
    "indoor games",
    "tennis court",
    "meditation center",
    "solar panels",
    "rainwater harvesting",
    "garage",
    "public_transit",
    "public transit",
];

const NO_CONTEXT: &str = "No dataset context available.";

/// Immutable vocabulary snapshot. All entries are lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnowledgeBase {
    cities: BTreeSet<String>,
    neighborhoods: BTreeSet<String>,
    amenities: BTreeSet<String>,
    nearby_types: BTreeSet<String>,
}

impl KnowledgeBase {
    /// Build a knowledge base from corpus vocabulary. Amenities are unioned
    /// with [`DEFAULT_AMENITIES`].
    pub fn register<S: AsRef<str>>(
        cities: &[S],
        neighborhoods: &[S],
        amenities: &[S],
        nearby_types: &[S],
    ) -> Self {
        let mut amenity_set = lower_set(amenities);
        amenity_set.extend(DEFAULT_AMENITIES.iter().map(|a| a.to_string()));

        let kb = Self {
            cities: lower_set(cities),
            neighborhoods: lower_set(neighborhoods),
            amenities: amenity_set,
            nearby_types: lower_set(nearby_types),
        };

        tracing::info!(
            "Registered {} cities, {} neighborhoods, {} amenities, {} nearby place types",
            kb.cities.len(),
            kb.neighborhoods.len(),
            kb.amenities.len(),
            kb.nearby_types.len()
        );
        kb
    }

    pub fn cities(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(String::as_str)
    }

    pub fn neighborhoods(&self) -> impl Iterator<Item = &str> {
        self.neighborhoods.iter().map(String::as_str)
    }

    pub fn amenities(&self) -> impl Iterator<Item = &str> {
        self.amenities.iter().map(String::as_str)
    }

    pub fn nearby_types(&self) -> impl Iterator<Item = &str> {
        self.nearby_types.iter().map(String::as_str)
    }

    pub fn is_known_city(&self, name: &str) -> bool {
        self.cities.contains(&name.trim().to_lowercase())
    }

    pub fn is_known_neighborhood(&self, name: &str) -> bool {
        self.neighborhoods.contains(&name.trim().to_lowercase())
    }

    pub fn is_known_amenity(&self, name: &str) -> bool {
        self.amenities.contains(&name.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
            && self.neighborhoods.is_empty()
            && self.amenities.is_empty()
            && self.nearby_types.is_empty()
    }

    /// Sorted, human-readable summary used to prompt the LLM extractor.
    pub fn context(&self) -> String {
        let sections = [
            ("Cities", &self.cities),
            ("Neighborhoods", &self.neighborhoods),
            ("Amenities", &self.amenities),
            ("Nearby place types", &self.nearby_types),
        ];

        let parts: Vec<String> = sections
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(label, set)| {
                let values: Vec<&str> = set.iter().map(String::as_str).collect();
                format!("{label}: {}", values.join(", "))
            })
            .collect();

        if parts.is_empty() {
            NO_CONTEXT.to_string()
        } else {
            parts.join("\n")
        }
    }
}

fn lower_set<S: AsRef<str>>(values: &[S]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Shared cell holding the current knowledge base.
///
/// Readers take an `Arc` snapshot and keep it for the whole query; reloads
/// build a new base off-lock and swap the pointer.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeHandle {
    current: Arc<RwLock<Arc<KnowledgeBase>>>,
}

impl KnowledgeHandle {
    pub fn snapshot(&self) -> Arc<KnowledgeBase> {
        self.current.read().clone()
    }

    pub fn replace(&self, kb: KnowledgeBase) {
        let next = Arc::new(kb);
        *self.current.write() = next;
    }
}
