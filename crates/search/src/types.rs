//! Search result and routing types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which web backend produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Encyclopedia lookups
    Wikipedia,
    /// General web metasearch
    Searxng,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Wikipedia => "wikipedia",
            Provider::Searxng => "searxng",
        }
    }

    /// Case-insensitive lookup by name ("Wikipedia", "SearXNG", ...).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "wikipedia" => Some(Provider::Wikipedia),
            "searxng" => Some(Provider::Searxng),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Routing decision for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Historical and biographical questions, routed to the encyclopedia first
    Encyclopedic,
    /// Everything else, routed to general web search first
    General,
}

impl Tier {
    /// Provider tried first for this tier.
    pub fn primary(&self) -> Provider {
        match self {
            Tier::Encyclopedic => Provider::Wikipedia,
            Tier::General => Provider::Searxng,
        }
    }

    /// Provider tried when the primary returns nothing.
    pub fn fallback(&self) -> Provider {
        match self {
            Tier::Encyclopedic => Provider::Searxng,
            Tier::General => Provider::Wikipedia,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Encyclopedic => f.write_str("encyclopedic"),
            Tier::General => f.write_str("general"),
        }
    }
}

/// One web hit in the shape every provider normalizes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub provider: Provider,
}

/// Result of a tiered search: where the query was routed and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchOutcome {
    pub tier: Tier,

    /// Provider whose results were kept (the fallback when the primary was empty)
    pub provider_used: Provider,

    pub fell_back: bool,

    pub results: Vec<NormalizedSearchResult>,
}

impl WebSearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_serializes_lowercase() {
        let json = serde_json::to_string(&Provider::Searxng).unwrap();
        assert_eq!(json, "\"searxng\"");
    }

    #[test]
    fn test_provider_parse_ignores_case() {
        assert_eq!(Provider::parse("Wikipedia"), Some(Provider::Wikipedia));
        assert_eq!(Provider::parse(" SearXNG "), Some(Provider::Searxng));
        assert_eq!(Provider::parse("bing"), None);
    }

    #[test]
    fn test_tier_fallback_is_other_provider() {
        for tier in [Tier::Encyclopedic, Tier::General] {
            assert_ne!(tier.primary(), tier.fallback());
        }
    }
}
