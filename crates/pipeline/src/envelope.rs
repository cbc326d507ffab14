//! The answer envelope returned to every caller.

use baseera_search::NormalizedSearchResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on follow-up questions in an envelope.
pub const MAX_FOLLOW_UPS: usize = 3;

/// Outcome of a request as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    InsufficientData,
    /// Only produced by this service's own error paths
    Error,
}

/// Reply language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Id,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Id => "id",
        }
    }

    /// The two suggestions offered whenever there is nothing better to suggest.
    pub fn default_follow_ups(&self) -> Vec<String> {
        let questions: [&str; 2] = match self {
            Language::En => [
                "What is the story of Prophet Yusuf (Joseph)?",
                "Explain the importance of Surah Al-Fatiha.",
            ],
            Language::Id => [
                "Bagaimana kisah Nabi Yusuf?",
                "Jelaskan tentang keutamaan Surah Al-Fatihah.",
            ],
        };
        questions.iter().map(|q| q.to_string()).collect()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-shape JSON object returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEnvelope {
    pub status: Status,
    pub language: Language,
    pub answer: String,
    pub chain_of_thought: String,
    pub sources: Vec<String>,
    pub web_sources: Vec<NormalizedSearchResult>,
    pub follow_up_questions: Vec<String>,
}

impl AnswerEnvelope {
    /// An error envelope with the language's default follow-ups.
    pub fn error(
        language: Language,
        answer: impl Into<String>,
        chain_of_thought: impl Into<String>,
    ) -> Self {
        Self {
            status: Status::Error,
            language,
            answer: answer.into(),
            chain_of_thought: chain_of_thought.into(),
            sources: Vec::new(),
            web_sources: Vec::new(),
            follow_up_questions: language.default_follow_ups(),
        }
    }

    /// The knowledge index or another hard dependency is not ready.
    pub fn not_ready(language: Language, reason: &str) -> Self {
        let answer = match language {
            Language::En => "The knowledge base is not ready yet. Please try again later.",
            Language::Id => "Basis pengetahuan belum siap. Silakan coba lagi nanti.",
        };
        Self::error(language, answer, reason)
    }

    /// A backend failed while answering.
    pub fn failure(language: Language, reason: &str) -> Self {
        let answer = match language {
            Language::En => "Sorry, something went wrong while preparing your answer. Please try again.",
            Language::Id => "Maaf, terjadi kesalahan saat menyiapkan jawaban Anda. Silakan coba lagi.",
        };
        Self::error(language, answer, reason)
    }

    /// The request carried no usable query.
    pub fn empty_query() -> Self {
        Self::error(
            Language::En,
            "Please provide a question in the 'topic' field.",
            "The request did not contain a question.",
        )
    }

    /// Cap follow-up questions at [`MAX_FOLLOW_UPS`].
    pub fn cap_follow_ups(mut self) -> Self {
        self.follow_up_questions.truncate(MAX_FOLLOW_UPS);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_shape() {
        let envelope = AnswerEnvelope::error(Language::Id, "x", "y");
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["language"], "id");
        for key in ["answer", "chain_of_thought", "sources", "web_sources", "follow_up_questions"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(value["follow_up_questions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&Status::InsufficientData).unwrap(),
            "\"insufficient_data\""
        );
    }

    #[test]
    fn test_cap_follow_ups() {
        let mut envelope = AnswerEnvelope::error(Language::En, "x", "y");
        envelope.follow_up_questions = (0..5).map(|i| format!("q{}", i)).collect();
        assert_eq!(envelope.cap_follow_ups().follow_up_questions.len(), MAX_FOLLOW_UPS);
    }

    #[test]
    fn test_not_ready_is_localized() {
        let envelope = AnswerEnvelope::not_ready(Language::Id, "quran table missing");
        assert_eq!(envelope.status, Status::Error);
        assert!(envelope.answer.starts_with("Basis pengetahuan"));
        assert_eq!(envelope.chain_of_thought, "quran table missing");
    }
}
