//! Per-process application context.

use planbot_llm::GeminiClient;
use planbot_shared::Corpus;

/// Everything the request handler needs, built once before serving starts.
///
/// Immutable after construction: handlers borrow it, never mutate it, so
/// concurrent dispatch (if a transport ever does that) stays safe without
/// locks.
#[derive(Debug, Clone)]
pub struct AppContext {
    /// The extracted study-plan corpus.
    pub corpus: Corpus,
    /// Gemini API key resolved from the environment at startup.
    pub gemini_api_key: String,
    /// Client for the `generateContent` endpoint.
    pub llm: GeminiClient,
}

impl AppContext {
    pub fn new(corpus: Corpus, gemini_api_key: impl Into<String>, llm: GeminiClient) -> Self {
        Self {
            corpus,
            gemini_api_key: gemini_api_key.into(),
            llm,
        }
    }
}
