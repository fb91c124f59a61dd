//! Incoming message routing.
//!
//! Three shapes arrive from a chat transport: the start command, the help
//! command, and free-form question text. Commands get fixed replies without
//! touching the LLM; everything else goes through the answer pipeline and
//! out through the segmenter.

use tracing::{debug, instrument};

use crate::context::AppContext;
use crate::pipeline;

/// Reply to the start command.
pub const GREETING: &str = "Hi! I'm a chat assistant that helps you explore the master's \
programme curricula. Ask me a question about the study plans.";

/// Reply to the help command.
pub const HELP_TEXT: &str = "I can answer questions about the master's programme study \
plans and curricula. Just type your question.";

/// A routed incoming message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// `/start`, exactly or followed by arguments.
    Start,
    /// `/help`, exactly or followed by arguments.
    Help,
    /// A command this bot does not know.
    UnknownCommand(String),
    /// Anything else: treat the whole message as a question.
    Question(String),
}

/// Classify a raw message by its first whitespace-delimited token.
pub fn route(text: &str) -> Incoming {
    let trimmed = text.trim();
    let first = trimmed.split_whitespace().next().unwrap_or("");

    match first {
        "/start" => Incoming::Start,
        "/help" => Incoming::Help,
        _ if first.starts_with('/') => Incoming::UnknownCommand(first.to_string()),
        _ => Incoming::Question(trimmed.to_string()),
    }
}

/// Handle one incoming message, producing the ordered fragments to send.
///
/// Command replies are short and go out as a single fragment. Unknown
/// commands are dropped with a log line rather than answered, so stray
/// slash-text never burns an LLM call.
#[instrument(skip_all, fields(chars = text.chars().count()))]
pub async fn handle_message(ctx: &AppContext, text: &str) -> Vec<String> {
    match route(text) {
        Incoming::Start => vec![GREETING.to_string()],
        Incoming::Help => vec![HELP_TEXT.to_string()],
        Incoming::UnknownCommand(command) => {
            debug!(%command, "ignoring unknown command");
            Vec::new()
        }
        Incoming::Question(question) => {
            let reply = pipeline::answer(ctx, &question).await;
            planbot_segment::segment_default(&reply)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planbot_llm::GeminiClient;
    use planbot_shared::Corpus;

    fn context() -> AppContext {
        let llm = GeminiClient::new("http://127.0.0.1:9", "gemini-2.0-flash").expect("client");
        AppContext::new(Corpus::new(), "", llm)
    }

    #[test]
    fn routes_start_and_help_with_or_without_arguments() {
        assert_eq!(route("/start"), Incoming::Start);
        assert_eq!(route("  /start deep_link"), Incoming::Start);
        assert_eq!(route("/help"), Incoming::Help);
        assert_eq!(route("/help me"), Incoming::Help);
    }

    #[test]
    fn routes_unknown_slash_commands() {
        assert_eq!(
            route("/settings dark"),
            Incoming::UnknownCommand("/settings".to_string())
        );
    }

    #[test]
    fn routes_plain_text_as_a_question() {
        assert_eq!(
            route("  What courses run in semester 1?  "),
            Incoming::Question("What courses run in semester 1?".to_string())
        );
    }

    #[test]
    fn slash_mid_text_is_still_a_question() {
        assert_eq!(
            route("what does 30/60 ECTS mean?"),
            Incoming::Question("what does 30/60 ECTS mean?".to_string())
        );
    }

    #[tokio::test]
    async fn start_yields_the_greeting_without_the_pipeline() {
        let fragments = handle_message(&context(), "/start").await;
        assert_eq!(fragments, vec![GREETING.to_string()]);
    }

    #[tokio::test]
    async fn help_yields_the_help_text() {
        let fragments = handle_message(&context(), "/help").await;
        assert_eq!(fragments, vec![HELP_TEXT.to_string()]);
    }

    #[tokio::test]
    async fn unknown_command_yields_nothing() {
        let fragments = handle_message(&context(), "/unknown").await;
        assert!(fragments.is_empty());
    }

    #[tokio::test]
    async fn question_against_an_empty_corpus_gets_the_fixed_reply() {
        let fragments = handle_message(&context(), "anything").await;
        assert_eq!(fragments, vec![pipeline::REPLY_NO_CORPUS.to_string()]);
    }
}
