//! Events emitted by the agent loop, one per state-machine transition.
//!
//! Events are consumed strictly in emission order and never revised after
//! emission. The reference transport is line-oriented: one `data: <json>`
//! line per event, newline-terminated, closed by a `[DONE]` terminator line,
//! suitable for incremental delivery over any byte stream.

use serde::Serialize;
use serde_json::Value;

use crate::tools::VisualArtifact;

/// A single agent loop transition.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// The loop started for a query.
    Start { query: String },
    /// The model produced a chunk of intermediate reasoning.
    Reasoning { number: usize, content: String },
    /// The model requested a tool invocation.
    ToolCall {
        number: usize,
        tool: String,
        parameters: Value,
    },
    /// A tool invocation completed.
    ToolResult {
        tool: String,
        duration_ms: u64,
        result: String,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        artifacts: Vec<VisualArtifact>,
    },
    /// The model volunteered its final answer.
    FinalAnswer { content: String },
    /// Tally of the finished run. Always the last content-bearing event.
    Summary {
        reasoning_count: usize,
        tool_call_count: usize,
    },
    /// The run failed; carries the classified explanation.
    Error { message: String },
}

/// Terminator line signaling end of stream.
pub const TERMINATOR_LINE: &str = "data: [DONE]\n";

/// Render one event as a prefixed, newline-terminated line.
pub fn render_line(event: &AgentEvent) -> String {
    let json = serde_json::to_string(event).expect("agent events serialize infallibly");
    format!("data: {}\n", json)
}
