//! JSON contract the synthesis stage must satisfy.

/// Schema text substituted for `{{schema}}` in the synthesis stage.
pub const ANSWER_SCHEMA: &str = r#"{
    "status": "ok" | "insufficient_data",
    "language": "en" | "id",
    "answer": "Natural, helpful reply in user's language.",
    "chain_of_thought": "Step-by-step reasoning based ONLY on allowed sources.",
    "sources": ["Exact quotes or crisp paraphrases from Quran/Hadith or web snippets you actually used."],
    "web_sources": [{"title":"...", "url":"...", "snippet":"...", "provider":"wikipedia|searxng"}],
    "follow_up_questions": ["Question 1", "Question 2"]
}"#;
