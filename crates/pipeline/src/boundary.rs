//! Request boundary: every query ends as an `AnswerEnvelope`.

use crate::envelope::AnswerEnvelope;
use crate::handle::AppContext;
use crate::language::detect_language;
use tracing::{error, instrument, warn};

/// How a request ended, for callers that map outcomes to status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Answered,
    /// Missing or blank query
    BadRequest,
    /// Pipeline could not be built (e.g. corpus tables not ingested)
    Unavailable,
    /// A backend failed mid-request
    Failed,
}

impl Disposition {
    pub fn http_status(&self) -> u16 {
        match self {
            Disposition::Answered => 200,
            Disposition::BadRequest => 400,
            Disposition::Unavailable => 503,
            Disposition::Failed => 500,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoundaryResponse {
    pub disposition: Disposition,
    pub envelope: AnswerEnvelope,
}

impl BoundaryResponse {
    fn new(disposition: Disposition, envelope: AnswerEnvelope) -> Self {
        Self {
            disposition,
            envelope,
        }
    }
}

/// Answer one query: small talk first, then the pipeline.
#[instrument(skip(context, query), fields(query_len = query.len()))]
pub async fn handle_query(context: &AppContext, query: &str) -> BoundaryResponse {
    let query = query.trim();
    if query.is_empty() {
        return BoundaryResponse::new(Disposition::BadRequest, AnswerEnvelope::empty_query());
    }

    if let Some(envelope) = context.small_talk.intercept(query) {
        return BoundaryResponse::new(Disposition::Answered, envelope);
    }

    let language = detect_language(query);

    let pipeline = match context.pipeline.get().await {
        Ok(pipeline) => pipeline,
        Err(e) => {
            if e.is_unavailable() {
                warn!(error = %e, "Pipeline not ready; corpus tables may need `baseera ingest`");
            } else {
                error!(error = %e, "Pipeline construction failed");
            }
            return BoundaryResponse::new(
                Disposition::Unavailable,
                AnswerEnvelope::not_ready(language, &e.to_string()),
            );
        }
    };

    match pipeline.answer(query).await {
        Ok(envelope) => BoundaryResponse::new(Disposition::Answered, envelope),
        Err(e) => {
            error!(error = %e, "Pipeline failed");
            BoundaryResponse::new(
                Disposition::Failed,
                AnswerEnvelope::failure(language, &e.to_string()),
            )
        }
    }
}

/// Envelope-only variant of [`handle_query`].
pub async fn answer_query(context: &AppContext, query: &str) -> AnswerEnvelope {
    handle_query(context, query).await.envelope
}
