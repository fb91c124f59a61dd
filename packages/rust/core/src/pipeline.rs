//! The per-question answer pipeline.
//!
//! One question in, one reply string out. Degraded states (no corpus, no
//! key) and every classified LLM failure map to a fixed user-facing reply;
//! the detail goes to the log, never to the user. The pipeline itself never
//! returns an error — the serving loop must survive any single question.

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use planbot_shared::{Corpus, PlanbotError};

use crate::context::AppContext;

// ---------------------------------------------------------------------------
// Fixed user-facing replies
// ---------------------------------------------------------------------------

/// Reply when no study-plan text was loaded at startup.
pub const REPLY_NO_CORPUS: &str = "I don't have any study-plan information yet. \
Please make sure the source documents have been downloaded and processed.";

/// Reply when the Gemini API key is absent.
pub const REPLY_MISCONFIGURED: &str =
    "Error: the AI service is not configured. Please contact the bot administrator.";

/// Reply when the endpoint was unreachable or returned an error status.
pub const REPLY_UNREACHABLE: &str = "Sorry, I could not reach the AI service for an answer. \
Check your internet connection or the API key.";

/// Reply when the response body was not valid JSON.
pub const REPLY_UNPARSEABLE: &str =
    "Sorry, I could not process the AI service response. The data format may be wrong.";

/// Reply when the JSON lacked the expected answer field.
pub const REPLY_INVALID: &str = "Sorry, I received an invalid response from the AI service.";

/// Reply for anything unexpected inside request handling.
pub const REPLY_INTERNAL: &str = "Sorry, an internal error occurred.";

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Role preamble instructing the model to answer only from the supplied
/// context and to decline explicitly when the information is absent.
const PROMPT_PREAMBLE: &str = "You are a chat assistant helping prospective students \
understand master's programme curricula. Answer questions using only the study-plan \
text provided below. If the information is missing from the text, say that you cannot \
answer the question from the available data.";

/// Build the full prompt: preamble, concatenated corpus, literal question.
///
/// The corpus is joined wholesale — no relevance ranking. Cheap next to the
/// LLM round-trip at current corpus sizes, though it will not scale to a
/// large document set.
pub fn build_prompt(corpus: &Corpus, question: &str) -> String {
    let context = corpus.values().cloned().collect::<Vec<_>>().join("\n\n");
    format!(
        "{PROMPT_PREAMBLE}\n\nStudy-plan context:\n\n{context}\n\nApplicant's question: {question}"
    )
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Answer one question against the loaded corpus.
///
/// Exactly one `generateContent` call is made, and only when both the
/// corpus and the API key are present. No retry; a failure of any kind
/// resolves to its fixed reply.
#[instrument(skip_all, fields(request_id = %Uuid::now_v7(), question_chars = question.chars().count()))]
pub async fn answer(ctx: &AppContext, question: &str) -> String {
    if ctx.corpus.is_empty() {
        warn!("question received but the corpus is empty");
        return REPLY_NO_CORPUS.to_string();
    }

    if ctx.gemini_api_key.is_empty() {
        error!("question received but no Gemini API key is configured");
        return REPLY_MISCONFIGURED.to_string();
    }

    let prompt = build_prompt(&ctx.corpus, question);
    info!(prompt_chars = prompt.chars().count(), "calling generateContent");

    match ctx.llm.generate(&prompt, &ctx.gemini_api_key).await {
        Ok(text) => {
            info!(answer_chars = text.chars().count(), "answer received");
            text
        }
        Err(PlanbotError::Network(detail)) => {
            error!(%detail, "generateContent unreachable");
            REPLY_UNREACHABLE.to_string()
        }
        Err(PlanbotError::LlmParse(detail)) => {
            error!(%detail, "generateContent body unparseable");
            REPLY_UNPARSEABLE.to_string()
        }
        Err(PlanbotError::LlmShape(detail)) => {
            warn!(%detail, "generateContent body missing answer field");
            REPLY_INVALID.to_string()
        }
        Err(e) => {
            error!(error = %e, "unexpected failure answering question");
            REPLY_INTERNAL.to_string()
        }
    }
}
