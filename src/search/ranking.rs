//! Hard filtering, boost scoring and explanation of a candidate pool.
//!
//! Pipeline:
//! 1. Drop candidates outside the budget, with a different bedroom count, or
//!    with fewer bathrooms than requested.
//! 2. Add boosts for location, amenity, preference/proximity and property
//!    type matches, recording a reason for each.
//! 3. Combined score = vector similarity + boost; stable sort, descending.
//! 4. Truncate to `top_k` and build explained results.

use crate::models::{Candidate, NearbyPlace, Property, ResultMetadata, SearchResult, StructuredConstraints};

pub const LOCATION_BOOST: f64 = 0.15;
pub const AMENITY_BOOST: f64 = 0.05;
pub const PREFERENCE_BOOST: f64 = 0.05;
pub const PROPERTY_TYPE_BOOST: f64 = 0.10;
pub const PROXIMITY_BOOST: f64 = 0.10;
/// Distance within which a "near X" preference counts as satisfied.
pub const PROXIMITY_THRESHOLD_M: f64 = 300.0;
pub const MAX_TOP_K: usize = 50;

/// Preference keyword → nearby-place category. Multi-word keywords come
/// before the single words they contain; first match wins.
const PLACE_CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("school", "school"),
    ("hospital", "hospital"),
    ("tech park", "office"),
    ("it park", "office"),
    ("park", "park"),
    ("metro", "transit"),
    ("transit", "transit"),
    ("shop", "shop"),
    ("market", "shop"),
    ("mall", "shop"),
    ("gym", "gym"),
    ("office", "office"),
    ("beach", "beach"),
    ("temple", "temple"),
    ("church", "church"),
    ("mosque", "mosque"),
    ("university", "university"),
    ("college", "university"),
];

#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub boost: f64,
    pub reasons: Vec<String>,
}

impl ScoredCandidate {
    pub fn combined_score(&self) -> f64 {
        f64::from(self.candidate.vector_score) + self.boost
    }
}

/// Filter, boost, sort and explain `pool`. `top_k` is clamped to `1..=50`.
pub fn rank(
    constraints: &StructuredConstraints,
    pool: Vec<Candidate>,
    top_k: usize,
) -> Vec<SearchResult> {
    let top_k = top_k.clamp(1, MAX_TOP_K);

    let filtered: Vec<Candidate> = pool
        .into_iter()
        .filter(|c| passes_hard_filters(constraints, &c.property))
        .collect();
    tracing::info!("After strict filters: {} candidates remain", filtered.len());

    let mut scored: Vec<ScoredCandidate> = filtered
        .into_iter()
        .map(|c| score_candidate(constraints, c))
        .collect();

    scored.sort_by(|a, b| {
        b.combined_score()
            .partial_cmp(&a.combined_score())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);

    scored
        .iter()
        .map(|s| build_result(constraints, s))
        .collect()
}

pub fn passes_hard_filters(constraints: &StructuredConstraints, property: &Property) -> bool {
    if constraints.budget_max.is_some_and(|max| property.price > max) {
        return false;
    }
    if constraints.budget_min.is_some_and(|min| property.price < min) {
        return false;
    }
    if constraints.bedrooms.is_some_and(|beds| property.bedrooms != beds) {
        return false;
    }
    if constraints.bathrooms.is_some_and(|baths| property.bathrooms < baths) {
        return false;
    }
    true
}

pub fn score_candidate(constraints: &StructuredConstraints, candidate: Candidate) -> ScoredCandidate {
    let property = &candidate.property;
    let mut boost = 0.0;
    let mut reasons = Vec::new();

    if let Some(loc) = matching_location(&constraints.locations, property) {
        boost += LOCATION_BOOST;
        reasons.push(format!("Location match: {loc}"));
    }

    let amenities = lowercase_all(&property.amenities);
    let matched_amenities: Vec<&str> = constraints
        .amenities
        .iter()
        .filter(|a| amenity_matches(a, &amenities))
        .map(String::as_str)
        .collect();
    if !matched_amenities.is_empty() {
        boost += AMENITY_BOOST * matched_amenities.len() as f64;
        reasons.push(format!("amenities: {}", matched_amenities.join(", ")));
    }

    let (pref_boost, pref_reasons) = preference_boost(&constraints.preferences, property, &amenities);
    boost += pref_boost;
    reasons.extend(pref_reasons);

    if let Some(wanted) = &constraints.property_type {
        let matches = property
            .property_type
            .as_deref()
            .is_some_and(|t| !t.is_empty() && t.eq_ignore_ascii_case(wanted));
        if matches {
            boost += PROPERTY_TYPE_BOOST;
            reasons.push(format!("property type: {wanted}"));
        }
    }

    ScoredCandidate {
        candidate,
        boost,
        reasons,
    }
}

/// First requested location found in the listing's city, neighborhood or
/// address (or containing its city/neighborhood). Absent fields never match.
fn matching_location<'a>(locations: &'a [String], property: &Property) -> Option<&'a str> {
    let city = property.city.as_deref().unwrap_or_default().to_lowercase();
    let neighborhood = property.neighborhood.to_lowercase();
    let address = property.address.as_deref().unwrap_or_default().to_lowercase();

    locations.iter().map(String::as_str).find(|loc| {
        let loc = loc.to_lowercase();
        if loc.is_empty() {
            return false;
        }
        let within = |field: &str| !field.is_empty() && field.contains(&loc);
        let around = |field: &str| !field.is_empty() && loc.contains(field);
        within(&city)
            || within(&neighborhood)
            || within(&address)
            || around(&city)
            || around(&neighborhood)
    })
}

fn amenity_matches(wanted: &str, amenities: &[String]) -> bool {
    let wanted = wanted.to_lowercase();
    if wanted.is_empty() {
        return false;
    }
    let spaced = wanted.replace('_', " ");
    amenities.iter().any(|a| *a == wanted || *a == spaced)
        || amenities
            .iter()
            .any(|a| !a.is_empty() && (a.contains(&wanted) || wanted.contains(a.as_str())))
}

fn preference_boost(
    preferences: &[String],
    property: &Property,
    amenities: &[String],
) -> (f64, Vec<String>) {
    let nearby_flat: Vec<String> = property
        .nearby_places
        .iter()
        .map(|p| p.flattened().to_lowercase())
        .collect();
    let description = property.description.to_lowercase();

    let mut boost = 0.0;
    let mut matched = Vec::new();
    let mut proximity = Vec::new();

    for pref in preferences {
        let pref_lower = pref.to_lowercase();
        if pref_lower.is_empty() {
            continue;
        }

        if let Some(category) = place_category(&pref_lower) {
            if let Some(place) = nearest_of_category(&property.nearby_places, category) {
                let dist = place.distance_m as i64;
                if place.distance_m <= PROXIMITY_THRESHOLD_M {
                    boost += PROXIMITY_BOOST;
                    proximity.push(format!("nearby {category}: {} ({dist}m)", place.name));
                } else {
                    boost += PREFERENCE_BOOST * 0.5;
                    proximity.push(format!(
                        "{category}: {} ({dist}m, outside {}m)",
                        place.name, PROXIMITY_THRESHOLD_M as i64
                    ));
                }
                matched.push(pref.as_str());
                continue;
            }
        }

        if nearby_flat
            .iter()
            .any(|place| place.contains(&pref_lower) || pref_lower.contains(place.as_str()))
        {
            boost += PREFERENCE_BOOST;
            matched.push(pref.as_str());
        } else if amenities.iter().any(|a| a.contains(&pref_lower)) {
            boost += PREFERENCE_BOOST;
            matched.push(pref.as_str());
        } else if description.contains(&pref_lower) {
            boost += PREFERENCE_BOOST * 0.5;
            matched.push(pref.as_str());
        }
    }

    let reasons = if !proximity.is_empty() {
        proximity
    } else if !matched.is_empty() {
        vec![format!("preferences: {}", matched.join(", "))]
    } else {
        Vec::new()
    };
    (boost, reasons)
}

pub fn place_category(preference: &str) -> Option<&'static str> {
    PLACE_CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| preference.contains(keyword))
        .map(|(_, category)| *category)
}

/// Closest place whose type matches `category`; the earliest listed wins ties.
fn nearest_of_category<'a>(places: &'a [NearbyPlace], category: &str) -> Option<&'a NearbyPlace> {
    places
        .iter()
        .filter(|p| {
            let kind = p.kind.to_lowercase();
            !kind.is_empty() && (kind == category || kind.contains(category) || category.contains(kind.as_str()))
        })
        .fold(None, |best: Option<&NearbyPlace>, p| match best {
            Some(b) if b.distance_m <= p.distance_m => Some(b),
            _ => Some(p),
        })
}

fn build_result(constraints: &StructuredConstraints, scored: &ScoredCandidate) -> SearchResult {
    let property = &scored.candidate.property;
    let vector_score = f64::from(scored.candidate.vector_score);

    let mut parts = vec![format!("base similarity={vector_score:.2}")];
    if constraints.has_budget() {
        parts.push(format!("price Rs.{} within budget", group_thousands(property.price)));
    }
    if constraints.bedrooms.is_some() {
        parts.push(format!("{} bedrooms as requested", property.bedrooms));
    }
    parts.extend(scored.reasons.iter().cloned());

    SearchResult {
        property_id: property.id.clone(),
        title: property.title.clone(),
        relevance_score: round4(scored.combined_score().min(1.0)),
        vector_score: round4(vector_score),
        explanation: parts.join("; "),
        metadata: ResultMetadata::from(property),
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_lowercase()).collect()
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Whole-number amount with comma thousands separators, e.g. `35,000`.
fn group_thousands(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}
