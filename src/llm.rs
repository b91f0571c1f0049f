//! Claude API integration for week generation.
//!
//! Thin transport wrapper around the Anthropic Messages API: auth header,
//! timeout, typed request/response structs, and a truncation flag the
//! parser pipeline uses to decide how loudly to log.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, Result};

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const CLAUDE_API_BASE: &str = "https://api.anthropic.com";
const CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// ---------------------------------------------------------------------------
/// Claude API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ClaudeRequest {
  model: String,
  max_tokens: u32,
  system: String,
  messages: Vec<ClaudeMessage>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
  content: Vec<ContentBlock>,
  #[allow(dead_code)]
  model: Option<String>,
  stop_reason: Option<String>,
  usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(rename = "type")]
  content_type: String,
  text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
  pub input_tokens: u32,
  pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorResponse {
  error: ClaudeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ClaudeErrorDetail {
  message: String,
}

/// One finished generation attempt's transport-level result
#[derive(Debug)]
pub struct Completion {
  pub text: String,
  /// True when generation stopped at the output limit; the repair path
  /// is expected to be needed
  pub truncated: bool,
  pub usage: Usage,
}

/// ---------------------------------------------------------------------------
/// Claude Client
/// ---------------------------------------------------------------------------

pub struct ClaudeClient {
  client: Client,
  api_key: String,
  base_url: String,
}

impl ClaudeClient {
  /// Create a client, loading the API key from the environment.
  ///
  /// Reads a .env file if one is present. A missing key is a fatal
  /// configuration error raised before any network call.
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| PlanError::MissingApiKey)?;
    Ok(Self::new(api_key))
  }

  pub fn new(api_key: String) -> Self {
    Self {
      client: Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_default(),
      api_key,
      base_url: CLAUDE_API_BASE.to_string(),
    }
  }

  /// Point the client at a different host (mock server in tests)
  pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
    self.base_url = base_url.into();
    self
  }

  /// Call Claude with a system prompt and user message
  pub async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
  ) -> Result<Completion> {
    let request = ClaudeRequest {
      model: CLAUDE_MODEL.to_string(),
      max_tokens,
      system: system_prompt.to_string(),
      messages: vec![ClaudeMessage {
        role: "user".to_string(),
        content: user_message.to_string(),
      }],
    };

    let url = format!("{}/v1/messages", self.base_url);
    debug!(max_tokens, prompt_len = user_message.len(), "sending generation request");

    let response = self
      .client
      .post(&url)
      .header("x-api-key", &self.api_key)
      .header("anthropic-version", API_VERSION)
      .header("content-type", "application/json")
      .json(&request)
      .send()
      .await
      .map_err(|e| PlanError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| PlanError::Request(e.to_string()))?;

    if !status.is_success() {
      // Prefer the API's own error message when the body carries one
      if let Ok(error_resp) = serde_json::from_str::<ClaudeErrorResponse>(&body) {
        return Err(PlanError::Api(error_resp.error.message));
      }
      return Err(PlanError::Api(format!("HTTP {}: {}", status, body)));
    }

    let claude_response: ClaudeResponse =
      serde_json::from_str(&body).map_err(|e| PlanError::Parse(e.to_string()))?;

    let text = claude_response
      .content
      .iter()
      .find(|c| c.content_type == "text")
      .and_then(|c| c.text.clone())
      .ok_or_else(|| PlanError::Parse("No text content in response".to_string()))?;

    let truncated = claude_response.stop_reason.as_deref() == Some("max_tokens");

    Ok(Completion {
      text,
      truncated,
      usage: claude_response.usage,
    })
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;
  use serial_test::serial;

  #[test]
  #[serial]
  fn test_missing_api_key_is_configuration_error() {
    temp_env::with_var("ANTHROPIC_API_KEY", None::<&str>, || {
      let result = ClaudeClient::from_env();
      assert!(matches!(result, Err(PlanError::MissingApiKey)));
    });
  }

  #[test]
  #[serial]
  fn test_from_env_reads_key() {
    temp_env::with_var("ANTHROPIC_API_KEY", Some("sk-test-key"), || {
      let client = ClaudeClient::from_env().expect("key is set");
      assert_eq!(client.api_key, "sk-test-key");
    });
  }

  #[tokio::test]
  async fn test_complete_extracts_text_and_truncation_flag() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
      .mock("POST", "/v1/messages")
      .match_header("x-api-key", "test-key")
      .match_header("anthropic-version", API_VERSION)
      .with_status(200)
      .with_body(
        r#"{
          "content": [{"type": "text", "text": "{\"workouts\": []}"}],
          "model": "claude-sonnet-4-20250514",
          "stop_reason": "max_tokens",
          "usage": {"input_tokens": 1200, "output_tokens": 800}
        }"#,
      )
      .create_async()
      .await;

    let client = ClaudeClient::new("test-key".to_string()).with_base_url(server.url());
    let completion = client.complete("system", "user", 1000).await.unwrap();

    assert_eq!(completion.text, r#"{"workouts": []}"#);
    assert!(completion.truncated);
    assert_eq!(completion.usage.output_tokens, 800);
    mock.assert_async().await;
  }

  #[tokio::test]
  async fn test_api_error_body_surfaces_message() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/v1/messages")
      .with_status(429)
      .with_body(r#"{"error": {"type": "rate_limit_error", "message": "Rate limited"}}"#)
      .create_async()
      .await;

    let client = ClaudeClient::new("test-key".to_string()).with_base_url(server.url());
    let err = client.complete("system", "user", 1000).await.unwrap_err();

    match err {
      PlanError::Api(msg) => assert_eq!(msg, "Rate limited"),
      other => panic!("expected Api error, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn test_non_json_error_body_reports_status() {
    let mut server = mockito::Server::new_async().await;
    server
      .mock("POST", "/v1/messages")
      .with_status(500)
      .with_body("upstream blew up")
      .create_async()
      .await;

    let client = ClaudeClient::new("test-key".to_string()).with_base_url(server.url());
    let err = client.complete("system", "user", 1000).await.unwrap_err();

    match err {
      PlanError::Api(msg) => assert!(msg.contains("500")),
      other => panic!("expected Api error, got {:?}", other),
    }
  }
}
