use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::LlmConfig;
use crate::knowledge::KnowledgeBase;
use crate::models::StructuredConstraints;
use crate::query::rules::PROPERTY_TYPES;

const SYSTEM_PROMPT: &str = r#"You are a real-estate search query parser. Given a user's natural-language property search query, extract structured filters as JSON.

Return ONLY valid JSON, no markdown fences, no explanation:
{
  "budget_min": <number or null>,
  "budget_max": <number or null>,
  "bedrooms": <int or null>,
  "bathrooms": <int or null>,
  "property_type": <string or null>,
  "locations": [<strings>],
  "amenities": [<strings>],
  "preferences": [<strings>]
}

Rules:
1. BUDGET: k=thousand, L/lac/lakh=100000, Cr/crore=10000000, M/million=1000000. Only extract a budget when the number refers to price. "40k sq ft" is an area, not a budget.
2. NEGATION: omit any location, amenity or preference the user negates ("not on Pine Street", "no gym").
3. AMENITIES: map natural phrases to canonical names, e.g. "pets allowed" -> "pet_friendly", "place to work out" -> "gym", "can park my car" -> "parking", "place to swim" -> "swimming pool", "has AC" -> "ac", "gated" -> "security".
4. PROPERTY TYPES: apartment, villa, studio, penthouse, loft, cottage, farmhouse, co-living, duplex. flat -> apartment, house/bungalow -> villa.
5. PREFERENCES: lifestyle or proximity phrases such as "near school", "quiet", "sea view", "near metro", kept as written.
6. LOCATIONS: cities and neighborhoods the user wants to live in.
7. If budget_min > budget_max, set both to null.
8. Use null for missing scalars and [] for missing lists."#;

/// Extract constraints by asking the configured LLM.
pub async fn extract(
    client: &reqwest::Client,
    config: &LlmConfig,
    query: &str,
    kb: &KnowledgeBase,
) -> Result<StructuredConstraints> {
    let user_prompt = format!(
        "Parse this property search query:\n\"{}\"\n\nKnown values from the dataset:\n{}",
        query.trim(),
        kb.context()
    );

    let raw = crate::llm::chat::complete(client, config, SYSTEM_PROMPT, &user_prompt).await?;
    let parsed = parse_response(query, &raw)?;

    tracing::info!(
        "[llm] Parsed query: {}",
        serde_json::to_string(&parsed).unwrap_or_default()
    );
    Ok(parsed)
}

#[derive(Debug, Deserialize)]
struct LlmConstraints {
    budget_min: Option<f64>,
    budget_max: Option<f64>,
    bedrooms: Option<u32>,
    bathrooms: Option<u32>,
    property_type: Option<String>,
    #[serde(default)]
    locations: Vec<String>,
    #[serde(default)]
    amenities: Vec<String>,
    #[serde(default)]
    preferences: Vec<String>,
}

/// Validate an LLM reply and turn it into constraints.
pub(crate) fn parse_response(query: &str, raw: &str) -> Result<StructuredConstraints> {
    let json = strip_code_fences(raw);
    let data: LlmConstraints = serde_json::from_str(json)
        .with_context(|| format!("LLM reply is not a constraints object: {raw}"))?;

    for (name, value) in [("budget_min", data.budget_min), ("budget_max", data.budget_max)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                anyhow::bail!("LLM returned invalid {name}: {v}");
            }
        }
    }

    let property_type = data
        .property_type
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .and_then(|t| {
            if PROPERTY_TYPES.contains(&t.as_str()) {
                Some(t)
            } else {
                tracing::warn!("Ignoring unknown property type from LLM: {t}");
                None
            }
        });

    let mut parsed = StructuredConstraints {
        original_query: query.to_string(),
        budget_min: data.budget_min,
        budget_max: data.budget_max,
        bedrooms: data.bedrooms,
        bathrooms: data.bathrooms,
        property_type,
        locations: clean_terms(data.locations),
        amenities: clean_terms(data.amenities),
        preferences: clean_terms(data.preferences),
    };
    parsed.discard_contradictory_budget();
    Ok(parsed)
}

/// Strip a surrounding ```` ``` ```` / ```` ```json ```` fence, if any.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn clean_terms(terms: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !out.contains(&term) {
            out.push(term);
        }
    }
    out
}
