//! Turns raw synthesis output into an `AnswerEnvelope`.
//!
//! The model is asked for a bare JSON object but sometimes wraps it in a
//! Markdown fence or answers in prose. Anything that is not a JSON object of the
//! expected shape becomes a deterministic error envelope. Inside a valid object,
//! `web_sources` is read leniently: entries that do not parse are dropped.

use crate::envelope::{AnswerEnvelope, Language, Status};
use baseera_search::{NormalizedSearchResult, Provider};
use serde::Deserialize;
use serde_json::Value;

const UNPARSEABLE_NOTE: &str = "The model output could not be parsed as the expected JSON object.";

/// Envelope as the model writes it; optional fields are filled in afterwards.
#[derive(Debug, Deserialize)]
struct ModelEnvelope {
    #[serde(default)]
    status: Option<Status>,
    #[serde(default)]
    language: Option<Language>,
    answer: String,
    #[serde(default)]
    chain_of_thought: String,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    web_sources: Vec<Value>,
    #[serde(default)]
    follow_up_questions: Vec<String>,
}

/// A web source as the model echoes it back.
#[derive(Debug, Deserialize)]
struct ModelWebSource {
    title: String,
    url: String,
    #[serde(default)]
    snippet: Option<String>,
    provider: String,
}

impl ModelWebSource {
    fn normalize(self) -> Option<NormalizedSearchResult> {
        Some(NormalizedSearchResult {
            title: self.title,
            url: self.url,
            snippet: self.snippet.unwrap_or_default(),
            provider: Provider::parse(&self.provider)?,
        })
    }
}

fn read_web_sources(items: Vec<Value>) -> Vec<NormalizedSearchResult> {
    let total = items.len();
    let sources: Vec<_> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<ModelWebSource>(item).ok())
        .filter_map(ModelWebSource::normalize)
        .collect();

    if sources.len() < total {
        tracing::debug!(dropped = total - sources.len(), "Skipped unreadable web sources");
    }
    sources
}

/// Remove one surrounding ```` ```json ```` or ```` ``` ```` fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse raw model output into an envelope. Never fails.
///
/// `fallback_language` is used for a missing `language` field and for the
/// error envelope.
pub fn sanitize(raw: &str, fallback_language: Language) -> AnswerEnvelope {
    let text = strip_code_fence(raw);

    match serde_json::from_str::<ModelEnvelope>(text) {
        Ok(parsed) => {
            let language = parsed.language.unwrap_or(fallback_language);
            let follow_up_questions = if parsed.follow_up_questions.is_empty() {
                language.default_follow_ups()
            } else {
                parsed.follow_up_questions
            };

            AnswerEnvelope {
                status: parsed.status.unwrap_or(Status::Ok),
                language,
                answer: parsed.answer,
                chain_of_thought: parsed.chain_of_thought,
                sources: parsed.sources,
                web_sources: read_web_sources(parsed.web_sources),
                follow_up_questions,
            }
            .cap_follow_ups()
        }
        Err(e) => {
            tracing::warn!(error = %e, raw_len = raw.len(), "Synthesis output was not a valid answer object");
            malformed(fallback_language)
        }
    }
}

fn malformed(language: Language) -> AnswerEnvelope {
    let answer = match language {
        Language::En => "The response was not in a valid format. Please try again.",
        Language::Id => "Respons tidak dalam format yang valid. Silakan coba lagi.",
    };
    AnswerEnvelope::error(language, answer, UNPARSEABLE_NOTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_malformed(envelope: &AnswerEnvelope, language: Language) {
        assert_eq!(envelope.status, Status::Error);
        assert_eq!(envelope.language, language);
        assert_eq!(envelope.chain_of_thought, UNPARSEABLE_NOTE);
        assert!(envelope.sources.is_empty());
        assert!(envelope.web_sources.is_empty());
        assert_eq!(envelope.follow_up_questions, language.default_follow_ups());
    }

    #[test]
    fn test_plain_text_is_malformed() {
        let envelope = sanitize("not json", Language::En);
        assert_malformed(&envelope, Language::En);
        assert_eq!(
            envelope.answer,
            "The response was not in a valid format. Please try again."
        );
    }

    #[test]
    fn test_fenced_invalid_json_is_malformed() {
        let envelope = sanitize("```json\n{not valid}\n```", Language::Id);
        assert_malformed(&envelope, Language::Id);
    }

    #[test]
    fn test_fenced_valid_json() {
        let raw = "```json\n{\"status\":\"ok\",\"language\":\"en\",\"answer\":\"Patience.\",\
                   \"chain_of_thought\":\"Surah Yusuf.\",\"sources\":[\"12:18\"],\
                   \"web_sources\":[{\"title\":\"Joseph\",\"url\":\"https://en.wikipedia.org/wiki/Joseph\",\
                   \"snippet\":\"...\",\"provider\":\"wikipedia\"}],\
                   \"follow_up_questions\":[\"a\",\"b\"]}\n```";
        let envelope = sanitize(raw, Language::En);

        assert_eq!(envelope.status, Status::Ok);
        assert_eq!(envelope.answer, "Patience.");
        assert_eq!(envelope.sources, vec!["12:18"]);
        assert_eq!(envelope.web_sources.len(), 1);
        assert_eq!(envelope.follow_up_questions.len(), 2);
    }

    #[test]
    fn test_bare_fence_without_language_tag() {
        let envelope = sanitize("```\n{\"answer\":\"ok\"}\n```", Language::En);
        assert_eq!(envelope.status, Status::Ok);
        assert_eq!(envelope.answer, "ok");
    }

    #[test]
    fn test_missing_fields_are_filled() {
        let envelope = sanitize(r#"{"answer":"Jawaban"}"#, Language::Id);
        assert_eq!(envelope.status, Status::Ok);
        assert_eq!(envelope.language, Language::Id);
        assert!(envelope.sources.is_empty());
        assert_eq!(envelope.follow_up_questions, Language::Id.default_follow_ups());
    }

    #[test]
    fn test_web_source_provider_case_ignored() {
        let envelope = sanitize(
            r#"{"answer":"Badr was fought in 624 CE.","web_sources":[
                {"title":"Battle of Badr","url":"https://en.wikipedia.org/wiki/Battle_of_Badr",
                 "snippet":"...","provider":"Wikipedia"}]}"#,
            Language::En,
        );

        assert_eq!(envelope.status, Status::Ok);
        assert_eq!(envelope.web_sources.len(), 1);
        assert_eq!(envelope.web_sources[0].provider, Provider::Wikipedia);
    }

    #[test]
    fn test_unreadable_web_sources_skipped() {
        let envelope = sanitize(
            r#"{"answer":"Zakat is 2.5%.","web_sources":[
                {"title":"No provider","url":"https://example.org"},
                {"title":"Null url","url":null,"provider":"searxng"},
                {"title":"Unknown engine","url":"https://example.org","provider":"bing"},
                "just a string",
                {"title":"Zakat","url":"https://example.org/zakat","provider":"searxng"}]}"#,
            Language::En,
        );

        assert_eq!(envelope.status, Status::Ok);
        assert_eq!(envelope.answer, "Zakat is 2.5%.");
        assert_eq!(envelope.web_sources.len(), 1);
        assert_eq!(envelope.web_sources[0].title, "Zakat");
        assert_eq!(envelope.web_sources[0].snippet, "");
    }

    #[test]
    fn test_insufficient_data_passes_through() {
        let envelope = sanitize(
            r#"{"status":"insufficient_data","language":"en","answer":"Not enough evidence."}"#,
            Language::En,
        );
        assert_eq!(envelope.status, Status::InsufficientData);
    }

    #[test]
    fn test_wrong_shapes_are_malformed() {
        for raw in [
            "[1, 2, 3]",
            "\"just a string\"",
            r#"{"status":"ok"}"#,
            r#"{"answer": 42}"#,
            r#"{"answer":"x","sources":"not a list"}"#,
            r#"{"answer":"x","status":"maybe"}"#,
            r#"{"answer":"x","language":"fr"}"#,
            r#"{"answer":"x","web_sources":"none"}"#,
        ] {
            assert_malformed(&sanitize(raw, Language::En), Language::En);
        }
    }

    #[test]
    fn test_follow_ups_capped() {
        let envelope = sanitize(
            r#"{"answer":"x","follow_up_questions":["1","2","3","4","5"]}"#,
            Language::En,
        );
        assert_eq!(envelope.follow_up_questions, vec!["1", "2", "3"]);
    }
}
