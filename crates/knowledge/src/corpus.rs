//! Corpus identifiers and retrieved passages.

use baseera_core::config::KnowledgeConfig;
use baseera_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two scripture corpora.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Corpus {
    Quran,
    Hadith,
}

impl Corpus {
    pub const ALL: [Corpus; 2] = [Corpus::Quran, Corpus::Hadith];

    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "quran" | "qur'an" => Ok(Corpus::Quran),
            "hadith" => Ok(Corpus::Hadith),
            other => Err(AppError::Config(format!(
                "Unknown corpus: {}. Expected quran or hadith",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Corpus::Quran => "quran",
            Corpus::Hadith => "hadith",
        }
    }

    /// Table holding this corpus.
    pub fn table_name<'a>(&self, config: &'a KnowledgeConfig) -> &'a str {
        match self {
            Corpus::Quran => &config.quran_table,
            Corpus::Hadith => &config.hadith_table,
        }
    }
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passage returned by similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub content: String,
    pub corpus: Corpus,
    /// Cosine similarity to the query, higher is closer
    pub score: f32,
}

/// Passages from both corpora for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorpusPassages {
    pub quran: Vec<RetrievedPassage>,
    pub hadith: Vec<RetrievedPassage>,
}

impl CorpusPassages {
    pub fn is_empty(&self) -> bool {
        self.quran.is_empty() && self.hadith.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corpus() {
        assert_eq!(Corpus::parse("Quran").unwrap(), Corpus::Quran);
        assert_eq!(Corpus::parse("hadith").unwrap(), Corpus::Hadith);
        assert!(Corpus::parse("tafsir").is_err());
    }

    #[test]
    fn test_table_name_follows_config() {
        let mut config = KnowledgeConfig::default();
        config.hadith_table = "hadith_v2".to_string();
        assert_eq!(Corpus::Quran.table_name(&config), "quran");
        assert_eq!(Corpus::Hadith.table_name(&config), "hadith_v2");
    }
}
