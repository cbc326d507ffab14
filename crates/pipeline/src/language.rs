//! Keyword-based English/Indonesian detection.

use crate::envelope::Language;

/// Indonesian markers; substring matches, so affixed forms like "apakah" count.
const INDONESIAN_KEYWORDS: &[&str] = &[
    "apa",
    "siapa",
    "kapan",
    "dimana",
    "mengapa",
    "bagaimana",
    "terima kasih",
    "maaf",
    "halo",
    "kamu",
];

/// `Language::Id` if the lowercased query contains any Indonesian keyword.
pub fn detect_language(query: &str) -> Language {
    let lower = query.to_lowercase();
    if INDONESIAN_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Language::Id
    } else {
        Language::En
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indonesian_queries() {
        assert_eq!(detect_language("Siapa kamu?"), Language::Id);
        assert_eq!(detect_language("Apakah hukum musik?"), Language::Id);
        assert_eq!(detect_language("Terima kasih banyak"), Language::Id);
    }

    #[test]
    fn test_english_queries() {
        assert_eq!(detect_language("What is the story of Prophet Yusuf?"), Language::En);
        assert_eq!(detect_language(""), Language::En);
    }
}
