// Claude Messages API client.
//
// Requests are sent with `stream: true`; the text deltas are collected into a
// single reply. Status errors and in-stream `error` events are turned into
// `LlmError` with the API's own message when it sends one.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde_json::Value;
use tracing::{debug, warn};

use huddle_core::config::Config;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("network error: {0}")]
    Transport(String),

    #[error("reply stream ended without any text")]
    EmptyReply,
}

impl LlmError {
    async fn from_stream(err: reqwest_eventsource::Error) -> Self {
        match err {
            reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
                let body = response.text().await.unwrap_or_default();
                let message = api_error_message(&body).unwrap_or_else(|| {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                });
                LlmError::Status {
                    status: status.as_u16(),
                    message,
                }
            }
            reqwest_eventsource::Error::Transport(e) => LlmError::Transport(e.to_string()),
            other => LlmError::Transport(other.to_string()),
        }
    }
}

/// Claude client for one model and API key.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_api_url(ANTHROPIC_API_URL.to_string(), api_key, model)
    }

    /// Client that posts to `api_url` instead of the public endpoint.
    pub fn with_api_url(api_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    /// `None` unless the credentials carry a non-empty API key.
    pub fn from_config(config: &Config) -> Option<Self> {
        config
            .credentials
            .anthropic_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Self::new(key.to_string(), config.llm.model.clone()))
    }

    /// Send one user message and return the assembled reply text.
    pub async fn complete(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": prompt }]
        });

        let mut source = self
            .http
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .eventsource()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let result = collect_reply(&mut source).await;
        source.close();
        result
    }
}

async fn collect_reply(source: &mut EventSource) -> Result<String, LlmError> {
    let mut reply = String::new();
    while let Some(event) = source.next().await {
        match event {
            Ok(Event::Open) => debug!("reply stream opened"),
            Ok(Event::Message(message)) => {
                match read_message(&message.event, &message.data, &mut reply) {
                    Step::Continue => {}
                    Step::Done => return Ok(reply),
                    Step::Failed(message) => return Err(LlmError::Api(message)),
                }
            }
            Err(reqwest_eventsource::Error::StreamEnded) => break,
            Err(err) => {
                warn!("reply stream failed: {err}");
                return Err(LlmError::from_stream(err).await);
            }
        }
    }
    if reply.is_empty() {
        Err(LlmError::EmptyReply)
    } else {
        Ok(reply)
    }
}

/// What one server-sent event means for the reply being assembled.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Continue,
    Done,
    Failed(String),
}

fn read_message(event: &str, data: &str, reply: &mut String) -> Step {
    match event {
        "content_block_delta" => {
            if let Some(text) = delta_text(data) {
                reply.push_str(&text);
            }
            Step::Continue
        }
        "message_stop" => Step::Done,
        "error" => Step::Failed(api_error_message(data).unwrap_or_else(|| data.to_string())),
        _ => Step::Continue,
    }
}

/// `delta.text` of a `content_block_delta` payload.
fn delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?.get("text")?.as_str().map(str::to_string)
}

/// `error.message` of an API error body or `error` event.
fn api_error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_once, sse_body, sse_error_body};

    fn mock_client(url: String) -> ClaudeClient {
        ClaudeClient::with_api_url(url, "sk-test".into(), "test".into())
    }

    #[test]
    fn deltas_accumulate_until_stop() {
        let mut reply = String::new();
        let delta = |t: &str| {
            serde_json::json!({"type": "content_block_delta", "delta": {"type": "text_delta", "text": t}})
                .to_string()
        };
        assert_eq!(read_message("message_start", "{}", &mut reply), Step::Continue);
        assert_eq!(read_message("content_block_delta", &delta("[\"閃電"), &mut reply), Step::Continue);
        assert_eq!(read_message("content_block_delta", &delta("隊\"]"), &mut reply), Step::Continue);
        assert_eq!(read_message("ping", "{}", &mut reply), Step::Continue);
        assert_eq!(read_message("message_stop", "{}", &mut reply), Step::Done);
        assert_eq!(reply, "[\"閃電隊\"]");
    }

    #[test]
    fn malformed_delta_is_skipped() {
        let mut reply = String::from("ok");
        assert_eq!(read_message("content_block_delta", "{broken", &mut reply), Step::Continue);
        assert_eq!(reply, "ok");
    }

    #[test]
    fn error_event_carries_api_message() {
        let data = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let mut reply = String::new();
        assert_eq!(
            read_message("error", data, &mut reply),
            Step::Failed("Overloaded".into())
        );
        assert_eq!(
            read_message("error", "gateway hiccup", &mut reply),
            Step::Failed("gateway hiccup".into())
        );
    }

    #[test]
    fn from_config_needs_a_real_key() {
        let mut config = Config::default();
        assert!(ClaudeClient::from_config(&config).is_none());
        config.credentials.anthropic_api_key = Some("   ".to_string());
        assert!(ClaudeClient::from_config(&config).is_none());
        config.credentials.anthropic_api_key = Some("sk-ant-test-key".to_string());
        assert!(ClaudeClient::from_config(&config).is_some());
    }

    #[tokio::test]
    async fn complete_joins_streamed_text() {
        let body = sse_body(&["Hello", ", ", "world"]);
        let (url, server) = serve_once("200 OK", "text/event-stream", body).await;

        let text = mock_client(url).complete("s", "u", 50).await.unwrap();
        assert_eq!(text, "Hello, world");
        let _ = server.await;
    }

    #[tokio::test]
    async fn status_error_reports_api_message() {
        let body = r#"{"type":"error","error":{"type":"authentication_error","message":"Invalid API key"}}"#;
        let (url, server) =
            serve_once("401 Unauthorized", "application/json", body.to_string()).await;

        let err = mock_client(url).complete("s", "u", 50).await.unwrap_err();
        match err {
            LlmError::Status { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other}"),
        }
        let _ = server.await;
    }

    #[tokio::test]
    async fn status_error_without_body_uses_reason() {
        let (url, server) = serve_once("503 Service Unavailable", "text/plain", String::new()).await;

        let err = mock_client(url).complete("s", "u", 50).await.unwrap_err();
        assert_eq!(err.to_string(), "API returned status 503: Service Unavailable");
        let _ = server.await;
    }

    #[tokio::test]
    async fn error_event_mid_stream_fails_the_request() {
        let (url, server) =
            serve_once("200 OK", "text/event-stream", sse_error_body("Overloaded")).await;

        let err = mock_client(url).complete("s", "u", 50).await.unwrap_err();
        assert!(matches!(err, LlmError::Api(ref m) if m == "Overloaded"), "{err}");
        let _ = server.await;
    }
}
