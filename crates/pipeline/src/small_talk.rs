//! Canned replies for greetings and chit-chat, answered without retrieval.

use crate::envelope::{AnswerEnvelope, Language, Status};
use crate::language::detect_language;
use regex::Regex;
use std::sync::LazyLock;

pub const BOT_NAME: &str = "Baseera";

const PERSONALITY_NOTE: &str = "This is a direct response based on my programmed personality.";

/// Conversational intents, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Identity,
    Capability,
    HowAreYou,
    Thanks,
    Apology,
    Compliment,
    Farewell,
}

impl Intent {
    /// Canned reply in the given language.
    pub fn reply(&self, language: Language) -> String {
        match (self, language) {
            (Intent::Greeting, Language::En) => format!(
                "Wa'alaikumussalam! I am {}, your companion on the journey of seeking knowledge. How can I assist you today?",
                BOT_NAME
            ),
            (Intent::Greeting, Language::Id) => format!(
                "Wa'alaikumussalam! Saya {}, pendamping Anda dalam perjalanan mencari ilmu. Ada yang bisa saya bantu hari ini?",
                BOT_NAME
            ),
            (Intent::Identity, Language::En) => format!(
                "I am {}. My purpose is to be a friendly guide, helping you find light and understanding from the Qur'an and Sunnah in a modern, accessible way.",
                BOT_NAME
            ),
            (Intent::Identity, Language::Id) => format!(
                "Saya {}. Tujuan saya adalah menjadi pemandu yang ramah, membantu Anda menemukan cahaya dan pemahaman dari Al-Qur'an dan Sunnah dengan cara yang modern dan mudah diakses.",
                BOT_NAME
            ),
            (Intent::Capability, Language::En) => "You can ask me questions about the Qur'an, Hadith, and Islamic knowledge. I will do my best to provide a comprehensive answer by consulting religious texts and contemporary sources.".to_string(),
            (Intent::Capability, Language::Id) => "Anda bisa bertanya kepada saya mengenai Al-Qur'an, Hadis, dan pengetahuan Islam. Saya akan berusaha sebaik mungkin untuk memberikan jawaban yang komprehensif dengan merujuk pada teks-teks agama dan sumber-sumber kontemporer.".to_string(),
            (Intent::HowAreYou, Language::En) => "Alhamdulillah, I am functioning as intended and ready to assist you in your quest for knowledge.".to_string(),
            (Intent::HowAreYou, Language::Id) => "Alhamdulillah, saya berfungsi sebagaimana mestinya dan siap membantu Anda dalam pencarian ilmu.".to_string(),
            (Intent::Thanks, Language::En) => "You are most welcome. It is my pleasure to help. May your knowledge be beneficial.".to_string(),
            (Intent::Thanks, Language::Id) => "Sama-sama. Dengan senang hati saya membantu. Semoga ilmunya bermanfaat.".to_string(),
            (Intent::Apology, Language::En) => "No problem at all.".to_string(),
            (Intent::Apology, Language::Id) => "Tidak masalah.".to_string(),
            (Intent::Compliment, Language::En) => "Thank you! I am here to serve and assist you with the knowledge I have been provided.".to_string(),
            (Intent::Compliment, Language::Id) => "Terima kasih! Saya di sini untuk melayani dan membantu Anda dengan pengetahuan yang telah diberikan kepada saya.".to_string(),
            (Intent::Farewell, Language::En) => "Ma'a as-salam. Feel free to return whenever you have more questions.".to_string(),
            (Intent::Farewell, Language::Id) => "Ma'as-salam. Silakan kembali lagi jika ada pertanyaan lain.".to_string(),
        }
    }
}

const INTENT_PATTERNS: &[(Intent, &str)] = &[
    (
        Intent::Greeting,
        r"(?i)^\s*(hi|hello|hey|halo|as-salamu alaykum|assalamualaikum)\b",
    ),
    (
        Intent::Identity,
        r"(?i)\b(who are you|what are you|siapa kamu|kamu siapa)\b",
    ),
    (Intent::Identity, r"(?i)introduce yourself"),
    (
        Intent::Capability,
        r"(?i)\b(what can you do|help|bantuan|bisa apa saja)\b",
    ),
    (Intent::HowAreYou, r"(?i)\b(how are you|apa kabar)\b"),
    (
        Intent::Thanks,
        r"(?i)\b(thank you|thanks|syukran|terima kasih)\b",
    ),
    (Intent::Apology, r"(?i)\b(sorry|maaf)\b"),
    (
        Intent::Compliment,
        r"(?i)\b(good bot|you are smart|pintar sekali|keren)\b",
    ),
    (Intent::Farewell, r"(?i)\b(bye|goodbye|sampai jumpa)\b"),
];

static INTENTS: LazyLock<Vec<(Intent, Regex)>> = LazyLock::new(|| {
    INTENT_PATTERNS
        .iter()
        .filter_map(|(intent, p)| Regex::new(p).ok().map(|re| (*intent, re)))
        .collect()
});

/// Short-circuits conversational queries before the pipeline runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmallTalkInterceptor;

impl SmallTalkInterceptor {
    pub fn new() -> Self {
        Self
    }

    /// First matching intent, if any.
    pub fn classify(&self, query: &str) -> Option<Intent> {
        INTENTS
            .iter()
            .find(|(_, re)| re.is_match(query))
            .map(|(intent, _)| *intent)
    }

    /// A complete envelope for small talk, or `None` to continue with retrieval.
    pub fn intercept(&self, query: &str) -> Option<AnswerEnvelope> {
        let intent = self.classify(query)?;
        let language = detect_language(query);
        tracing::debug!(?intent, %language, "Answered as small talk");

        Some(AnswerEnvelope {
            status: Status::Ok,
            language,
            answer: intent.reply(language),
            chain_of_thought: PERSONALITY_NOTE.to_string(),
            sources: Vec::new(),
            web_sources: Vec::new(),
            follow_up_questions: language.default_follow_ups(),
        })
    }
}
