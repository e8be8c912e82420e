//! Tool executor: the registry of capabilities the reasoning model can call.
//!
//! The executor contract is "never raise": unknown tools, malformed
//! arguments, and upstream failures all degrade to an explanatory text
//! outcome, so the loop can always continue and let the model decide how to
//! react to an error message.

mod analyze;
mod deep_scrape;
mod web_search;

pub use analyze::AnalyzeContent;
pub use deep_scrape::DeepScrape;
pub use web_search::WebSearch;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::scrape::WebClient;

/// Outcome text budget; longer bodies are truncated with a marker.
const MAX_OUTCOME_CHARS: usize = 20_000;

/// A captured page image associated with a scraped URL.
#[derive(Debug, Clone, Serialize)]
pub struct VisualArtifact {
    pub source_url: String,
    /// Opaque image payload as returned upstream (URL or data URI).
    pub payload: String,
}

/// Normalized result of one tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutcome {
    pub text: String,
    pub artifacts: Vec<VisualArtifact>,
}

impl ToolOutcome {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            artifacts: Vec::new(),
        }
    }

    pub fn with_artifacts(text: impl Into<String>, artifacts: Vec<VisualArtifact>) -> Self {
        Self {
            text: text.into(),
            artifacts,
        }
    }
}

/// A capability the reasoning model can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Wire name, as listed in the tool schema catalogue.
    fn name(&self) -> &str;

    /// Human-facing name, used in emitted events.
    fn display_name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema for the tool's arguments.
    fn parameters_schema(&self) -> Value;

    async fn execute(&self, args: Value) -> anyhow::Result<ToolOutcome>;
}

/// Registry of available tools.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new(web: Arc<dyn WebClient>) -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(WebSearch::new(web.clone())),
            Arc::new(DeepScrape::new(web)),
            Arc::new(AnalyzeContent),
        ];

        Self { tools }
    }

    /// Tool schema catalogue in the shape the model API expects.
    pub fn get_tool_schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "input_schema": t.parameters_schema(),
                })
            })
            .collect()
    }

    /// All registered tools, for prompt construction.
    pub fn list_tools(&self) -> impl Iterator<Item = &Arc<dyn Tool>> {
        self.tools.iter()
    }

    /// Human-facing name for a tool, falling back to the wire name.
    pub fn display_name(&self, name: &str) -> String {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.display_name().to_string())
            .unwrap_or_else(|| name.to_string())
    }

    /// Execute a tool by name. Never fails: errors become explanatory text
    /// outcomes, and overlong text is clamped to the outcome budget.
    pub async fn execute(&self, name: &str, args: Value) -> ToolOutcome {
        let Some(tool) = self.tools.iter().find(|t| t.name() == name) else {
            return ToolOutcome::text(format!("Error: unknown tool '{}'", name));
        };

        let mut outcome = match tool.execute(args).await {
            Ok(outcome) => outcome,
            Err(e) => ToolOutcome::text(format!("Error: {}", e)),
        };

        outcome.text = clamp_text(outcome.text, MAX_OUTCOME_CHARS);
        outcome
    }
}

/// Truncate text to a byte budget at a char boundary, with a marker.
fn clamp_text(text: String, max_len: usize) -> String {
    if text.len() <= max_len {
        return text;
    }

    let mut cut = max_len;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }

    let mut truncated = text[..cut].to_string();
    truncated.push_str("\n... [truncated]");
    truncated
}

/// Single-line content preview: newlines collapsed to spaces, truncated with
/// an ellipsis marker.
pub(crate) fn preview(text: &str, max_len: usize) -> String {
    let collapsed: String = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.len() <= max_len {
        return collapsed;
    }

    let mut cut = max_len;
    while !collapsed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &collapsed[..cut])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::mock::MockWebClient;

    #[tokio::test]
    async fn test_unknown_tool_degrades_to_text() {
        let registry = ToolRegistry::new(Arc::new(MockWebClient::new()));

        let outcome = registry.execute("no_such_tool", json!({})).await;

        assert!(outcome.text.contains("unknown tool"));
        assert!(outcome.artifacts.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_arguments_degrade_to_text() {
        let registry = ToolRegistry::new(Arc::new(MockWebClient::new()));

        // web_search requires a query
        let outcome = registry.execute("web_search", json!({})).await;

        assert!(outcome.text.starts_with("Error:"));
    }

    #[test]
    fn test_clamp_text_respects_budget() {
        let long = "x".repeat(MAX_OUTCOME_CHARS + 100);
        let clamped = clamp_text(long, MAX_OUTCOME_CHARS);

        assert!(clamped.len() <= MAX_OUTCOME_CHARS + 20);
        assert!(clamped.ends_with("[truncated]"));
    }

    #[test]
    fn test_preview_collapses_newlines() {
        let p = preview("first line\nsecond\n\nthird", 100);
        assert_eq!(p, "first line second third");
    }

    #[test]
    fn test_preview_truncates_with_marker() {
        let p = preview(&"word ".repeat(200), 50);
        assert!(p.len() <= 53);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_registry_display_names() {
        let registry = ToolRegistry::new(Arc::new(MockWebClient::new()));

        assert_eq!(registry.display_name("web_search"), "Web Search");
        assert_eq!(registry.display_name("mystery"), "mystery");
    }

    #[test]
    fn test_schema_catalogue_shape() {
        let registry = ToolRegistry::new(Arc::new(MockWebClient::new()));
        let schemas = registry.get_tool_schemas();

        assert_eq!(schemas.len(), 3);
        for schema in &schemas {
            assert!(schema["name"].is_string());
            assert!(schema["input_schema"]["properties"].is_object());
        }
    }
}
