use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
// A batch completion can take a while; source fetches use a much tighter limit.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// One-shot client for the hosted messages endpoint. A batch is a single
/// request: non-success status fails the whole batch, no retry, no backoff.
pub struct GenerationClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl GenerationClient {
    pub fn from_env(model: &str, max_tokens: u32) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| anyhow!("{} environment variable must be set", API_KEY_ENV))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            model: model.to_string(),
            max_tokens,
        })
    }

    /// Send the rendered prompt as the sole user message and return the raw
    /// response text.
    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        info!("Calling generation API (model {})", self.model);
        let resp = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("Generation request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("Generation API returned {}: {}", status, detail);
        }

        let parsed: MessagesResponse = resp
            .json()
            .await
            .context("Generation response is not valid JSON")?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| anyhow!("Generation response contained no text content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_wire_format() {
        let body = MessagesRequest {
            model: DEFAULT_MODEL,
            max_tokens: DEFAULT_MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: "analyze these posts",
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], DEFAULT_MODEL);
        assert_eq!(value["max_tokens"], 4000);
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "analyze these posts");
    }

    #[test]
    fn response_text_is_first_text_block() {
        let raw = r#"{
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "[{\"post_id\":1}]"}
            ],
            "model": "claude-sonnet-4-5"
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.content.into_iter().find_map(|b| b.text).unwrap();
        assert_eq!(text, "[{\"post_id\":1}]");
    }

    #[test]
    fn textless_response_yields_none() {
        let raw = r#"{"content": [{"type": "tool_use"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.content.into_iter().find_map(|b| b.text).is_none());
    }
}
