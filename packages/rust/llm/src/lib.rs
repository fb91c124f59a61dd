//! Gemini `generateContent` wire types and HTTP client.
//!
//! The answer pipeline makes exactly one blocking call per question; there
//! is no retry or streaming. Failures are classified into three buckets the
//! pipeline maps onto fixed user-facing replies: the endpoint was
//! unreachable (transport error or non-2xx status), the body was not JSON,
//! or the JSON lacked the expected answer field.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use planbot_shared::{PlanbotError, Result};

/// Default timeout for a `generateContent` call.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User-Agent string for LLM requests.
const USER_AGENT: &str = concat!("planbot/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request body: `{"contents":[{"role":"user","parts":[{"text":...}]}]}`.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

impl GenerateRequest {
    /// Wrap a prompt as a single-turn user message.
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".into(),
                parts: vec![Part {
                    text: prompt.into(),
                }],
            }],
        }
    }
}

/// Success body shape: `{"candidates":[{"content":{"parts":[{"text":...}]}}]}`.
///
/// Every level is optional; the response is only valid when the whole chain
/// down to the first part's text is present.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pull the answer text out of a parsed response, if the shape holds.
fn answer_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// Create a client against `base_url` (no trailing slash) and `model`.
    ///
    /// In production `base_url` is `https://generativelanguage.googleapis.com`;
    /// tests point it at a local mock server.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlanbotError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Full request URL with the API key as a query parameter.
    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={api_key}",
            self.base_url, self.model
        )
    }

    /// Issue one `generateContent` call and return the answer text verbatim.
    ///
    /// One request, one response; the caller blocks until the endpoint
    /// answers or the timeout fires.
    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn generate(&self, prompt: &str, api_key: &str) -> Result<String> {
        let request = GenerateRequest::from_prompt(prompt);

        let response = self
            .http
            .post(self.endpoint(api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PlanbotError::Network(format!("generateContent: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %truncate(&body, 200), "generateContent returned an error status");
            return Err(PlanbotError::Network(format!(
                "generateContent: HTTP {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlanbotError::Network(format!("generateContent: body read failed: {e}")))?;

        let parsed: GenerateResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, body = %truncate(&body, 200), "generateContent body was not valid JSON");
            PlanbotError::LlmParse(e.to_string())
        })?;

        match answer_text(parsed) {
            Some(text) => {
                debug!(chars = text.chars().count(), "answer received");
                Ok(text)
            }
            None => {
                warn!(body = %truncate(&body, 200), "generateContent body lacked candidates[0].content.parts[0].text");
                Err(PlanbotError::LlmShape(
                    "response lacked the answer field".into(),
                ))
            }
        }
    }
}

/// Truncate a string for log output.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": text}]}}
            ]
        })
    }

    #[test]
    fn request_serializes_to_the_wire_shape() {
        let request = GenerateRequest::from_prompt("What courses are in semester 1?");
        let json = serde_json::to_string(&request).expect("serialize");
        assert!(json.starts_with(r#"{"contents":[{"role":"user","parts":[{"text":"#));
        assert!(json.contains("What courses are in semester 1?"));
    }

    #[test]
    fn endpoint_embeds_model_and_key() {
        let client = GeminiClient::new("https://example.test/", "gemini-2.0-flash").unwrap();
        assert_eq!(
            client.endpoint("secret"),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn answer_text_walks_the_happy_shape() {
        let parsed: GenerateResponse =
            serde_json::from_value(valid_body("Hello")).expect("deserialize");
        assert_eq!(answer_text(parsed).as_deref(), Some("Hello"));
    }

    #[test]
    fn answer_text_rejects_missing_levels() {
        for body in [
            serde_json::json!({}),
            serde_json::json!({"candidates": []}),
            serde_json::json!({"candidates": [{}]}),
            serde_json::json!({"candidates": [{"content": {"parts": []}}]}),
            serde_json::json!({"candidates": [{"content": {"parts": [{}]}}]}),
        ] {
            let parsed: GenerateResponse = serde_json::from_value(body).expect("deserialize");
            assert!(answer_text(parsed).is_none());
        }
    }

    #[tokio::test]
    async fn generate_returns_the_answer_verbatim() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path(
                "/v1beta/models/gemini-2.0-flash:generateContent",
            ))
            .and(wiremock::matchers::query_param("key", "test-key"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(valid_body("Hello")),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-2.0-flash").unwrap();
        let answer = client.generate("hi", "test-key").await.unwrap();
        assert_eq!(answer, "Hello");
    }

    #[tokio::test]
    async fn generate_maps_http_500_to_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-2.0-flash").unwrap();
        let err = client.generate("hi", "k").await.unwrap_err();
        assert!(matches!(err, PlanbotError::Network(_)));
    }

    #[tokio::test]
    async fn generate_maps_non_json_body_to_parse_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_string("<html>not json</html>"),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-2.0-flash").unwrap();
        let err = client.generate("hi", "k").await.unwrap_err();
        assert!(matches!(err, PlanbotError::LlmParse(_)));
    }

    #[tokio::test]
    async fn generate_maps_empty_object_to_shape_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(serde_json::json!({})),
            )
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-2.0-flash").unwrap();
        let err = client.generate("hi", "k").await.unwrap_err();
        assert!(matches!(err, PlanbotError::LlmShape(_)));
    }

    #[tokio::test]
    async fn generate_sends_the_wire_request_body() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "the prompt"}]}]
            })))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_json(valid_body("ok")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(server.uri(), "gemini-2.0-flash").unwrap();
        let answer = client.generate("the prompt", "k").await.unwrap();
        assert_eq!(answer, "ok");
    }
}
