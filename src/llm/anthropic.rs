//! Messages-API client with interleaved thinking enabled.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;

use super::{ContentBlock, ModelClient, ModelError, Turn};

const API_VERSION: &str = "2023-06-01";
const INTERLEAVED_THINKING_BETA: &str = "interleaved-thinking-2025-05-14";

/// Real reasoning-model client.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    thinking_budget: u32,
    base_url: String,
}

impl AnthropicClient {
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("deepscout/0.1")
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_key: config.anthropic_api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            thinking_budget: config.thinking_budget,
            base_url: "https://api.anthropic.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    message: String,
}

#[async_trait::async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        tools: &[Value],
    ) -> Result<Vec<ContentBlock>, ModelError> {
        let body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": system,
            "thinking": {
                "type": "enabled",
                "budget_tokens": self.thinking_budget,
            },
            "messages": turns,
            "tools": tools,
        });

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("anthropic-beta", INTERLEAVED_THINKING_BETA)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail: ErrorResponse = serde_json::from_str(&text).unwrap_or_else(|_| {
                ErrorResponse {
                    error: ErrorDetail {
                        kind: String::new(),
                        message: text.clone(),
                    },
                }
            });
            return Err(ModelError::classify(
                status.as_u16(),
                &detail.error.kind,
                &detail.error.message,
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Api(format!("malformed response body: {}", e)))?;

        Ok(parse_content_blocks(parsed.content))
    }
}

/// Map raw response blocks into the conversation model, skipping block types
/// the loop does not consume (redacted thinking, server tool use).
fn parse_content_blocks(raw: Vec<Value>) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();

    for value in raw {
        match serde_json::from_value::<ContentBlock>(value.clone()) {
            Ok(block) => blocks.push(block),
            Err(_) => {
                let kind = value
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown");
                debug!("Skipping unsupported content block type: {}", kind);
            }
        }
    }

    blocks
}
