//! Query routing between encyclopedia and general web search.

use crate::types::Tier;
use regex::Regex;

/// Encyclopedic cues in English and Indonesian; the first match wins.
const ENCYCLOPEDIC_PATTERNS: &[&str] = &[
    r"(?i)\b(history of|sejarah)\b",
    r"(?i)\b(who was|siapakah)\b",
    r"(?i)\b(when did|kapan)\b",
    r"(?i)\b(biography of|biografi)\b",
    r"(?i)\b(battle of|perang)\b",
    r"(?i)event",
];

/// Rule-based router deciding which web provider to try first.
pub struct SourceRouter {
    encyclopedic: Vec<Regex>,
}

impl Default for SourceRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRouter {
    pub fn new() -> Self {
        Self {
            encyclopedic: ENCYCLOPEDIC_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }

    /// Classify a query. No match, or an empty query, is `Tier::General`.
    pub fn classify(&self, query: &str) -> Tier {
        if self.encyclopedic.iter().any(|re| re.is_match(query)) {
            Tier::Encyclopedic
        } else {
            Tier::General
        }
    }
}
