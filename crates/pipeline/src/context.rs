//! Plain-text rendering of retrieved evidence.
//!
//! The same section renderers back the stage tools and the `context` command, so
//! the model always sees one layout.

use baseera_knowledge::{CorpusPassages, RetrievedPassage};
use baseera_search::{NormalizedSearchResult, WebSearchOutcome};
use serde::Serialize;

pub const QURAN_HEADER: &str = "QURANIC SOURCES:";
pub const HADITH_HEADER: &str = "HADITH SOURCES:";
pub const WEB_HEADER: &str = "WEB SOURCES:";

pub const NO_QURAN_PASSAGES: &str = "No Quranic passages found.";
pub const NO_HADITH_PASSAGES: &str = "No Hadith passages found.";
pub const NO_WEB_RESULTS: &str = "No results found from web search.";

/// Evidence for one query, rendered in fixed section order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledContext {
    pub text: String,
    pub passages: CorpusPassages,
    pub web: WebSearchOutcome,
}

fn render_passages(header: &str, placeholder: &str, passages: &[RetrievedPassage]) -> String {
    let body = if passages.is_empty() {
        placeholder.to_string()
    } else {
        passages
            .iter()
            .map(|p| p.content.trim())
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    format!("{}\n{}", header, body)
}

/// Quran and Hadith sections, separated by a blank line.
pub fn render_scripture(passages: &CorpusPassages) -> String {
    format!(
        "{}\n\n{}",
        render_passages(QURAN_HEADER, NO_QURAN_PASSAGES, &passages.quran),
        render_passages(HADITH_HEADER, NO_HADITH_PASSAGES, &passages.hadith)
    )
}

/// Web section; an empty result list renders the no-results marker.
pub fn render_web(results: &[NormalizedSearchResult]) -> String {
    let mut out = format!("{}\n", WEB_HEADER);
    if results.is_empty() {
        out.push_str(NO_WEB_RESULTS);
        return out;
    }
    for item in results {
        out.push_str(&format!(
            "Title: {}\nURL: {}\nSnippet: {}\n\n",
            item.title, item.url, item.snippet
        ));
    }
    out.truncate(out.trim_end().len());
    out
}

/// Concatenate all three sections. No ranking or de-duplication.
pub fn assemble(passages: CorpusPassages, web: WebSearchOutcome) -> AssembledContext {
    let text = format!("{}\n\n{}", render_scripture(&passages), render_web(&web.results));
    AssembledContext {
        text,
        passages,
        web,
    }
}
