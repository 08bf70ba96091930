use anyhow::Result;
use parking_lot::RwLock;

use crate::models::Property;

/// A stored vector entry
#[derive(Debug, Clone)]
struct VectorEntry {
    id: String,
    embedding: Vec<f32>,
    payload: Property,
}

#[derive(Debug, Default)]
struct Collection {
    dimension: usize,
    entries: Vec<VectorEntry>,
}

/// In-memory vector index with cosine similarity search.
#[derive(Debug, Default)]
pub struct VectorStore {
    collection: RwLock<Collection>,
}

#[derive(Debug, Clone)]
pub struct VectorHit {
    pub id: String,
    pub score: f32,
    pub payload: Property,
}

impl VectorStore {
    pub fn new(dimension: usize) -> Self {
        let store = Self::default();
        store.recreate(dimension);
        store
    }

    /// Drop every entry and fix the vector dimension for new ones.
    pub fn recreate(&self, dimension: usize) {
        let mut collection = self.collection.write();
        tracing::info!(
            "Recreating vector collection (dim={dimension}, dropping {} entries)",
            collection.entries.len()
        );
        *collection = Collection {
            dimension,
            entries: Vec::new(),
        };
    }

    /// Swap in a complete collection built off-lock. Readers see either the
    /// old entries or the new ones. Later duplicates of an id win, keeping
    /// the first position. Nothing changes if any vector has the wrong
    /// dimension.
    pub fn replace(
        &self,
        dimension: usize,
        items: Vec<(String, Vec<f32>, Property)>,
    ) -> Result<usize> {
        let mut entries: Vec<VectorEntry> = Vec::with_capacity(items.len());
        for (id, embedding, payload) in items {
            if embedding.len() != dimension {
                anyhow::bail!(
                    "Vector for '{id}' has dimension {}, collection expects {dimension}",
                    embedding.len()
                );
            }
            let entry = VectorEntry {
                id,
                embedding,
                payload,
            };
            match entries.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }

        let count = entries.len();
        *self.collection.write() = Collection { dimension, entries };
        tracing::info!("Installed vector collection (dim={dimension}, {count} entries)");
        Ok(count)
    }

    /// Insert a vector, replacing any existing entry with the same id.
    pub fn upsert(&self, id: &str, embedding: Vec<f32>, payload: Property) -> Result<()> {
        let mut collection = self.collection.write();
        if embedding.len() != collection.dimension {
            anyhow::bail!(
                "Vector for '{id}' has dimension {}, collection expects {}",
                embedding.len(),
                collection.dimension
            );
        }

        let entry = VectorEntry {
            id: id.to_string(),
            embedding,
            payload,
        };
        match collection.entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => collection.entries.push(entry),
        }
        Ok(())
    }

    /// Nearest neighbours by cosine similarity, best first. Ties keep
    /// insertion order.
    pub fn query(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let collection = self.collection.read();
        if query_embedding.len() != collection.dimension {
            anyhow::bail!(
                "Query vector has dimension {}, collection expects {}",
                query_embedding.len(),
                collection.dimension
            );
        }

        let mut scored: Vec<(f32, &VectorEntry)> = collection
            .entries
            .iter()
            .map(|e| (cosine_similarity(query_embedding, &e.embedding), e))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(score, e)| VectorHit {
                id: e.id.clone(),
                score,
                payload: e.payload.clone(),
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.collection.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dimension(&self) -> usize {
        self.collection.read().dimension
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
