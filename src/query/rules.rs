//! Deterministic rule-based query extraction.
//!
//! Every extractor runs on the lower-cased, trimmed query and never fails:
//! text that matches nothing simply leaves the corresponding field unset.
//! Lookup tables are matched in declaration order.

use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::LazyLock;

use crate::knowledge::KnowledgeBase;
use crate::models::StructuredConstraints;

/// Canonical property types.
pub const PROPERTY_TYPES: &[&str] = &[
    "apartment",
    "villa",
    "studio",
    "penthouse",
    "loft",
    "cottage",
    "farmhouse",
    "co-living",
    "duplex",
];

/// Surface keyword → canonical property type. First matching entry wins.
const PROPERTY_TYPE_KEYWORDS: &[(&str, &str)] = &[
    ("apartment", "apartment"),
    ("flat", "apartment"),
    ("villa", "villa"),
    ("house", "villa"),
    ("bungalow", "villa"),
    ("studio", "studio"),
    ("penthouse", "penthouse"),
    ("loft", "loft"),
    ("cottage", "cottage"),
    ("farmhouse", "farmhouse"),
    ("co-living", "co-living"),
    ("coliving", "co-living"),
    ("duplex", "duplex"),
    ("home", "apartment"),
];

/// Lifestyle and proximity phrases, kept verbatim when found.
const PREFERENCE_PHRASES: &[&str] = &[
    "near school",
    "close to school",
    "good schools",
    "nearby school",
    "near hospital",
    "close to hospital",
    "near metro",
    "close to metro",
    "metro connectivity",
    "metro access",
    "near park",
    "close to park",
    "near beach",
    "close to beach",
    "beachside",
    "beach access",
    "near mall",
    "close to mall",
    "shopping",
    "near market",
    "close to market",
    "near temple",
    "near church",
    "near mosque",
    "near university",
    "near college",
    "near it park",
    "close to it park",
    "it hub",
    "near transit",
    "close to transit",
    "transit hub",
    "near office",
    "close to office",
    "near tech park",
    "near shop",
    "close to shop",
    "nearby shop",
    "calm",
    "quiet",
    "peaceful",
    "serene",
    "tranquil",
    "vibrant",
    "lively",
    "bustling",
    "green",
    "eco-friendly",
    "nature",
    "scenic",
    "mountain view",
    "lake view",
    "sea view",
    "river view",
    "waterfront",
    "city centre",
    "city center",
    "central",
    "downtown",
    "family friendly",
    "kid friendly",
    "child friendly",
    "student friendly",
    "bachelor friendly",
    "pet friendly",
    "pet-friendly",
];

const CURRENCY: &str = r"(?:rs\.?|₹|inr)?";
const AMOUNT: &str = r"(\d+(?:,\d+)*(?:\.\d+)?)";
const BARE_AMOUNT: &str = r"\d+(?:,\d+)*(?:\.\d+)?";
const SUFFIX: &str = r"(?:(thousand|lakhs|lakh|lac|l|crores|crore|cr|million|m|k)\b)?";
const BARE_SUFFIX: &str = r"(?:(?:thousand|lakhs|lakh|lac|l|crores|crore|cr|million|m|k)\b)?";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static query pattern must compile")
}

static MAX_BUDGET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(&format!(
            r"\b(?:under|below|maximum|max|upto|up\s*to|within|budget|less\s*than|at\s*most)\s*(?:of\s*)?{CURRENCY}\s*{AMOUNT}\s*{SUFFIX}"
        )),
        compile(&format!(
            r"{CURRENCY}\s*{AMOUNT}\s*{SUFFIX}\s*(?:maximum|max|budget|or\s*less|or\s*below)\b"
        )),
        compile(&format!(
            r"{CURRENCY}\s*{BARE_AMOUNT}\s*{BARE_SUFFIX}\s*(?:-|to)\s*{CURRENCY}\s*{AMOUNT}\s*{SUFFIX}"
        )),
    ]
});

static MIN_BUDGET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(&format!(
            r"\b(?:above|over|minimum|min|at\s*least|more\s*than|starting|from)\s*(?:at\s*)?{CURRENCY}\s*{AMOUNT}\s*{SUFFIX}"
        )),
        compile(&format!(
            r"{CURRENCY}\s*{AMOUNT}\s*{SUFFIX}\s*(?:-|to)\s*{CURRENCY}\s*{BARE_AMOUNT}\s*{BARE_SUFFIX}"
        )),
    ]
});

/// A number followed by one of these is a size, count or duration, not a price.
static NON_PRICE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^\s*(?:sq\.?\s*(?:ft|feet|m|yd)|sqft|square|ft\b|feet|acres?\b|yards?\b|bed|bhk|br\b|bath|ba\b|rk\b|rooms?\b|mins?\b|minutes?|km\b|hours?\b|hrs?\b|years?\b|months?\b|people\b|persons?\b|adults?\b|members?\b|floors?\b)",
    )
});

static BEDROOM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        compile(r"\b(\d+)\s*(?:bed(?:room)?s?|bhk|br)\b"),
        compile(r"\b(\d+)\s*(?:rk|room)"),
    ]
});

static BATHROOM_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compile(r"\b(\d+)\s*(?:bath(?:room)?s?|ba)\b"));

static PROPERTY_TYPE_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    PROPERTY_TYPE_KEYWORDS
        .iter()
        .map(|(keyword, canonical)| {
            (
                compile(&format!(r"\b{}\b", regex::escape(keyword))),
                *canonical,
            )
        })
        .collect()
});

/// Run every rule against `query` using the given vocabulary snapshot.
pub fn parse(query: &str, kb: &KnowledgeBase) -> StructuredConstraints {
    let q = query.trim().to_lowercase();

    let mut parsed = StructuredConstraints {
        original_query: query.to_string(),
        budget_min: extract_budget_min(&q),
        budget_max: extract_budget_max(&q),
        bedrooms: extract_bedrooms(&q),
        bathrooms: extract_bathrooms(&q),
        property_type: extract_property_type(&q).map(str::to_string),
        locations: extract_locations(&q, kb),
        amenities: extract_amenities(&q, kb),
        preferences: extract_preferences(&q),
    };
    parsed.discard_contradictory_budget();

    tracing::info!(
        "[rules] Parsed query: {}",
        serde_json::to_string(&parsed).unwrap_or_default()
    );
    parsed
}

/// Convert a numeric literal with an optional magnitude suffix to an amount.
/// Thousands separators are ignored. Returns `None` if the number is invalid.
pub fn normalize_amount(value: &str, suffix: &str) -> Option<f64> {
    let num: f64 = value.replace(',', "").trim().parse().ok()?;
    if !num.is_finite() {
        return None;
    }

    let multiplier = match suffix.trim().to_lowercase().as_str() {
        "k" | "thousand" => 1_000.0,
        "l" | "lac" | "lakh" | "lakhs" => 100_000.0,
        "cr" | "crore" | "crores" => 10_000_000.0,
        "m" | "million" => 1_000_000.0,
        _ => 1.0,
    };
    Some(num * multiplier)
}

pub fn extract_budget_max(q: &str) -> Option<f64> {
    first_amount(q, &MAX_BUDGET_PATTERNS)
}

pub fn extract_budget_min(q: &str) -> Option<f64> {
    first_amount(q, &MIN_BUDGET_PATTERNS)
}

/// Patterns are tried in order; within a pattern, the leftmost match that is
/// a price (not followed by an area/room/duration unit) wins.
fn first_amount(q: &str, patterns: &[Regex]) -> Option<f64> {
    for pattern in patterns {
        for caps in pattern.captures_iter(q) {
            let Some(whole) = caps.get(0) else { continue };
            if NON_PRICE_UNIT.is_match(&q[whole.end()..]) {
                continue;
            }
            if let Some(amount) = amount_from(&caps) {
                return Some(amount);
            }
        }
    }
    None
}

fn amount_from(caps: &Captures<'_>) -> Option<f64> {
    let value = caps.get(1)?.as_str();
    let suffix = caps.get(2).map_or("", |m| m.as_str());
    normalize_amount(value, suffix)
}

pub fn extract_bedrooms(q: &str) -> Option<u32> {
    for pattern in BEDROOM_PATTERNS.iter() {
        if let Some(n) = pattern
            .captures(q)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
        {
            return Some(n);
        }
    }
    if q.contains("studio") {
        return Some(1);
    }
    None
}

pub fn extract_bathrooms(q: &str) -> Option<u32> {
    BATHROOM_PATTERN
        .captures(q)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn extract_property_type(q: &str) -> Option<&'static str> {
    PROPERTY_TYPE_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(q))
        .map(|(_, canonical)| *canonical)
}

/// Neighborhoods (substring) then cities (whole word), each longest first.
/// A name whose every occurrence lies inside an already matched, longer name
/// is skipped.
pub fn extract_locations(q: &str, kb: &KnowledgeBase) -> Vec<String> {
    let mut consumed = Vec::new();
    let mut found = longest_first_matches(q, kb.neighborhoods(), false, &mut consumed);

    for city in longest_first_matches(q, kb.cities(), true, &mut consumed) {
        if !found.contains(&city) {
            found.push(city);
        }
    }
    found
}

/// Known amenities as whole words or phrases, longest first.
pub fn extract_amenities(q: &str, kb: &KnowledgeBase) -> Vec<String> {
    let mut consumed = Vec::new();
    longest_first_matches(q, kb.amenities(), true, &mut consumed)
}

pub fn extract_preferences(q: &str) -> Vec<String> {
    PREFERENCE_PHRASES
        .iter()
        .filter(|phrase| q.contains(*phrase))
        .map(|phrase| phrase.to_string())
        .collect()
}

fn longest_first_matches<'a>(
    q: &str,
    names: impl Iterator<Item = &'a str>,
    whole_word: bool,
    consumed: &mut Vec<Range<usize>>,
) -> Vec<String> {
    let mut names: Vec<&str> = names.filter(|n| !n.is_empty()).collect();
    names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut found = Vec::new();
    for name in names {
        let spans = occurrences(q, name, whole_word);
        let fresh = spans
            .iter()
            .any(|span| !consumed.iter().any(|c| c.start <= span.start && span.end <= c.end));
        if fresh {
            found.push(name.to_string());
            consumed.extend(spans);
        }
    }
    found
}

fn occurrences(q: &str, name: &str, whole_word: bool) -> Vec<Range<usize>> {
    q.match_indices(name)
        .map(|(start, m)| start..start + m.len())
        .filter(|span| !whole_word || is_word_bounded(q, span))
        .collect()
}

/// True when `span` is neither preceded nor followed by a word character.
fn is_word_bounded(q: &str, span: &Range<usize>) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let before = q[..span.start].chars().next_back();
    let after = q[span.end..].chars().next();
    !before.is_some_and(is_word) && !after.is_some_and(is_word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::register(
            &["Springfield", "Pune"],
            &["Pine Street", "Old Pine Street", "Koregaon Park"],
            &["Rooftop Deck"],
            &["school", "transit"],
        )
    }

    #[test]
    fn test_normalize_amount_suffixes() {
        assert_eq!(normalize_amount("40", "k"), Some(40_000.0));
        assert_eq!(normalize_amount("1.5", "cr"), Some(15_000_000.0));
        assert_eq!(normalize_amount("2", "lakh"), Some(200_000.0));
        assert_eq!(normalize_amount("3", "million"), Some(3_000_000.0));
        assert_eq!(normalize_amount("750", ""), Some(750.0));
    }

    #[test]
    fn test_normalize_amount_strips_thousands_separators() {
        assert_eq!(normalize_amount("1,00,000", ""), Some(100_000.0));
        assert_eq!(normalize_amount("25,000", "k"), Some(25_000_000.0));
    }

    #[test]
    fn test_normalize_amount_rejects_garbage() {
        assert_eq!(normalize_amount("abc", "k"), None);
        assert_eq!(normalize_amount("", ""), None);
    }

    #[test]
    fn test_budget_max_keywords() {
        assert_eq!(extract_budget_max("flat under 40k"), Some(40_000.0));
        assert_eq!(extract_budget_max("budget of rs. 50,000"), Some(50_000.0));
        assert_eq!(extract_budget_max("up to 1.2 cr please"), Some(12_000_000.0));
        assert_eq!(extract_budget_max("30k or less"), Some(30_000.0));
        assert_eq!(extract_budget_max("₹45k max"), Some(45_000.0));
    }

    #[test]
    fn test_budget_range() {
        let q = "villa 50 lakh to 1 crore";
        assert_eq!(extract_budget_min(q), Some(5_000_000.0));
        assert_eq!(extract_budget_max(q), Some(10_000_000.0));

        let q = "rent 20k-35k";
        assert_eq!(extract_budget_min(q), Some(20_000.0));
        assert_eq!(extract_budget_max(q), Some(35_000.0));
    }

    #[test]
    fn test_budget_min_keywords() {
        assert_eq!(extract_budget_min("something above 2 cr"), Some(20_000_000.0));
        assert_eq!(extract_budget_min("at least 15000"), Some(15_000.0));
        assert_eq!(extract_budget_min("starting 80k"), Some(80_000.0));
    }

    #[test]
    fn test_area_is_not_a_budget() {
        assert_eq!(extract_budget_max("40k sq ft"), None);
        assert_eq!(extract_budget_min("40k sq ft"), None);
        assert_eq!(extract_budget_max("under 1200 sqft"), None);
        assert_eq!(extract_budget_max("under 40k"), Some(40_000.0));
    }

    #[test]
    fn test_room_ranges_are_not_budgets() {
        assert_eq!(extract_budget_max("2-3 bhk in pune"), None);
        assert_eq!(extract_budget_min("2-3 bhk in pune"), None);
    }

    #[test]
    fn test_durations_are_not_budgets() {
        assert_eq!(extract_budget_max("within 5 minutes of the metro"), None);
    }

    #[test]
    fn test_bare_number_is_not_a_budget() {
        assert_eq!(extract_budget_max("flat number 42 on the corner"), None);
        assert_eq!(extract_budget_min("flat number 42 on the corner"), None);
    }

    #[test]
    fn test_bedrooms() {
        assert_eq!(extract_bedrooms("2 bedroom flat"), Some(2));
        assert_eq!(extract_bedrooms("3bhk"), Some(3));
        assert_eq!(extract_bedrooms("4 beds"), Some(4));
        assert_eq!(extract_bedrooms("1 rk near station"), Some(1));
        assert_eq!(extract_bedrooms("cheap studio"), Some(1));
        assert_eq!(extract_bedrooms("2 bhk studio"), Some(2));
        assert_eq!(extract_bedrooms("a nice place"), None);
    }

    #[test]
    fn test_bathrooms() {
        assert_eq!(extract_bathrooms("3 bhk 2 bath"), Some(2));
        assert_eq!(extract_bathrooms("2 bathrooms"), Some(2));
        assert_eq!(extract_bathrooms("no baths mentioned"), None);
    }

    #[test]
    fn test_huge_counts_do_not_panic() {
        assert_eq!(extract_bedrooms("99999999999999 bhk"), None);
    }

    #[test]
    fn test_property_type_table_order() {
        assert_eq!(extract_property_type("2 bedroom flat"), Some("apartment"));
        assert_eq!(extract_property_type("a bungalow"), Some("villa"));
        assert_eq!(extract_property_type("coliving space"), Some("co-living"));
        assert_eq!(extract_property_type("studio apartment"), Some("apartment"));
        assert_eq!(extract_property_type("flatten"), None);
    }

    #[test]
    fn test_locations_prefer_longest_neighborhood() {
        let found = extract_locations("moving to old pine street soon", &kb());
        assert_eq!(found, vec!["old pine street"]);
    }

    #[test]
    fn test_locations_keep_separate_mentions() {
        let found = extract_locations("old pine street or pine street corner", &kb());
        assert_eq!(found, vec!["old pine street", "pine street"]);
    }

    #[test]
    fn test_locations_neighborhoods_before_cities() {
        let found = extract_locations("pune, koregaon park area", &kb());
        assert_eq!(found, vec!["koregaon park", "pune"]);
    }

    #[test]
    fn test_cities_match_whole_words_only() {
        assert!(extract_locations("punekar cuisine", &kb()).is_empty());
    }

    #[test]
    fn test_amenities_prefer_multi_word() {
        let found = extract_amenities("villa with swimming pool and gym", &kb());
        assert_eq!(found, vec!["swimming pool", "gym"]);
    }

    #[test]
    fn test_corpus_amenities_are_matched() {
        let found = extract_amenities("loft with a rooftop deck", &kb());
        assert_eq!(found, vec!["rooftop deck"]);
    }

    #[test]
    fn test_amenities_ignore_fragments_of_other_words() {
        assert!(extract_amenities("a nice place to live with my family", &kb()).is_empty());
        assert!(extract_amenities("peaceful flat near beach", &kb()).is_empty());
        assert_eq!(extract_amenities("flat with ac, near beach", &kb()), vec!["ac"]);
    }

    #[test]
    fn test_head_counts_are_not_budgets() {
        let c = parse("flat for 2 to 3 people", &kb());
        assert_eq!(c.budget_min, None);
        assert_eq!(c.budget_max, None);
        assert_eq!(extract_budget_max("lease of 6 to 12 months"), None);
        assert_eq!(extract_budget_min("between 4 - 5 floors"), None);
    }

    #[test]
    fn test_word_bounded_spans() {
        let q = "pune, punekar";
        assert!(is_word_bounded(q, &(0..4)));
        assert!(!is_word_bounded(q, &(6..10)));
        assert_eq!(occurrences(q, "pune", true), vec![0..4]);
        assert_eq!(occurrences(q, "pune", false), vec![0..4, 6..10]);
    }

    #[test]
    fn test_preferences_verbatim() {
        let found = extract_preferences("calm neighbourhood with good schools close to metro");
        assert_eq!(found, vec!["good schools", "close to metro", "calm"]);
    }

    #[test]
    fn test_parse_end_to_end_budget_flat() {
        let kb = KnowledgeBase::register(&["Springfield"], &[], &["parking"], &[]);
        let c = parse("2 bedroom flat under 40k near the city centre with parking", &kb);
        assert_eq!(c.bedrooms, Some(2));
        assert_eq!(c.budget_max, Some(40_000.0));
        assert_eq!(c.budget_min, None);
        assert_eq!(c.amenities, vec!["parking"]);
        assert_eq!(c.property_type.as_deref(), Some("apartment"));
        assert!(c.preferences.contains(&"city centre".to_string()));
    }

    #[test]
    fn test_parse_contradictory_budget() {
        let c = parse("above 50k and under 40k", &kb());
        assert_eq!(c.budget_min, None);
        assert_eq!(c.budget_max, None);
    }

    #[test]
    fn test_parse_keeps_original_text() {
        let c = parse("  Pine Street HOUSE  ", &kb());
        assert_eq!(c.original_query, "  Pine Street HOUSE  ");
        assert_eq!(c.locations, vec!["pine street"]);
        assert_eq!(c.property_type.as_deref(), Some("villa"));
    }

    #[test]
    fn test_parse_adversarial_input_only_sets_query() {
        let c = parse("\u{0}\u{0}((((**[[?", &KnowledgeBase::default());
        assert_eq!(c, StructuredConstraints::empty("\u{0}\u{0}((((**[[?"));
    }

    #[test]
    fn test_parse_without_knowledge_finds_no_locations() {
        let c = parse("house on pine street", &KnowledgeBase::default());
        assert!(c.locations.is_empty());
        assert!(c.amenities.is_empty());
    }

    #[test]
    fn test_reregistering_gives_identical_results() {
        let queries = [
            "2 bhk in pine street under 30k with gym",
            "villa in springfield with swimming pool",
            "studio close to metro",
        ];
        let first = kb();
        let second = kb();
        for q in queries {
            assert_eq!(parse(q, &first), parse(q, &second));
        }
    }
}
