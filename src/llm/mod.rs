//! Reasoning-model boundary: conversation types, client trait, and the
//! classified errors the agent loop propagates.
//!
//! A conversation is an ordered sequence of [`Turn`]s whose content is an
//! ordered sequence of [`ContentBlock`]s. The sequence strictly alternates:
//! a user turn, assistant turn(s) carrying thinking/tool-use blocks, and
//! synthetic user turns carrying the matching tool results. Every `ToolUse`
//! id is answered by exactly one `ToolResult` with the same id in the
//! immediately following user turn.

mod anthropic;
pub mod mock;

pub use anthropic::AnthropicClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Turn {
    /// A plain-text user turn (the incoming query).
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// An assistant turn carrying the model's response blocks.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A synthetic user turn carrying one tool result.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                tool_use_id: tool_use_id.into(),
                content: content.into(),
            }],
        }
    }
}

/// One segment of turn content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    /// Plain text. In an assistant turn with no tool use, this is the final
    /// answer; alongside a tool use it is preliminary commentary only.
    #[serde(rename = "text")]
    Text { text: String },
    /// Intermediate reasoning. The signature is an opaque passthrough so
    /// assistant turns replay verbatim on continuation calls.
    #[serde(rename = "thinking")]
    Thinking {
        thinking: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        signature: Option<String>,
    },
    /// A tool request with a unique per-request identifier.
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    /// The result for a prior tool request, matched by id.
    #[serde(rename = "tool_result")]
    ToolResult { tool_use_id: String, content: String },
}

/// Errors from the reasoning-model boundary. Any of these is fatal to the
/// run: conversation state mid-loop cannot be resumed without model
/// cooperation, so the loop never retries silently.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model authentication failed: {0}")]
    Authentication(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model feature not enabled: {0}")]
    FeatureNotEnabled(String),

    #[error("Model API error: {0}")]
    Api(String),

    #[error("Failed to reach model API: {0}")]
    Network(#[from] reqwest::Error),
}

impl ModelError {
    /// Classify an error payload from the provider into a distinguishable
    /// kind, so the caller can offer a tailored explanation.
    pub fn classify(status: u16, error_type: &str, message: &str) -> Self {
        let detail = if message.is_empty() {
            format!("HTTP {}", status)
        } else {
            message.to_string()
        };

        let lower = format!("{} {}", error_type, message).to_lowercase();
        if status == 401 || status == 403 || lower.contains("authentication") {
            ModelError::Authentication(detail)
        } else if lower.contains("not_found") || lower.contains("model:") {
            ModelError::ModelUnavailable(detail)
        } else if lower.contains("interleaved-thinking") || lower.contains("beta") {
            ModelError::FeatureNotEnabled(detail)
        } else {
            ModelError::Api(detail)
        }
    }
}

/// Client for the reasoning-model boundary.
///
/// One call submits the full turn history plus the system instruction and
/// tool schema catalogue, and returns the model's response as a complete
/// ordered block list (no partial consumption at the segment level).
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        tools: &[Value],
    ) -> Result<Vec<ContentBlock>, ModelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_authentication() {
        let err = ModelError::classify(401, "authentication_error", "invalid x-api-key");
        assert!(matches!(err, ModelError::Authentication(_)));
    }

    #[test]
    fn test_classify_model_unavailable() {
        let err = ModelError::classify(404, "not_found_error", "model: no-such-model");
        assert!(matches!(err, ModelError::ModelUnavailable(_)));
    }

    #[test]
    fn test_classify_feature_gate() {
        let err = ModelError::classify(
            400,
            "invalid_request_error",
            "interleaved-thinking-2025-05-14 is not enabled for this account",
        );
        assert!(matches!(err, ModelError::FeatureNotEnabled(_)));
    }

    #[test]
    fn test_classify_generic() {
        let err = ModelError::classify(529, "overloaded_error", "Overloaded");
        assert!(matches!(err, ModelError::Api(_)));
    }

    #[test]
    fn test_tool_result_turn_shape() {
        let turn = Turn::tool_result("toolu_01", "3 results found");

        assert_eq!(turn.role, Role::User);
        assert!(matches!(
            &turn.content[0],
            ContentBlock::ToolResult { tool_use_id, .. } if tool_use_id == "toolu_01"
        ));
    }

    #[test]
    fn test_content_block_serde_tags() {
        let block = ContentBlock::ToolUse {
            id: "toolu_01".to_string(),
            name: "web_search".to_string(),
            input: serde_json::json!({"query": "rust"}),
        };
        let json = serde_json::to_string(&block).unwrap();

        assert!(json.contains("\"type\":\"tool_use\""));

        let back: ContentBlock = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, ContentBlock::ToolUse { name, .. } if name == "web_search"));
    }
}
