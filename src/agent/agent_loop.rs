//! Core agent loop implementation.

use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::events::AgentEvent;
use crate::llm::{AnthropicClient, ContentBlock, ModelClient, ModelError, Turn};
use crate::scrape::{FirecrawlClient, WebClient};
use crate::tools::ToolRegistry;

use super::prompt::build_system_prompt;

/// Fatal agent failures. Tool-level failures never appear here: they are
/// converted to text results and fed back to the model instead.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Turn limit of {0} reached without a final answer")]
    TurnLimit(usize),
}

/// The research agent.
pub struct Agent {
    config: Config,
    llm: Arc<dyn ModelClient>,
    tools: ToolRegistry,
}

impl Agent {
    /// Create a new agent with the given configuration, wiring the real
    /// model and search/scrape clients.
    pub fn new(config: Config) -> Self {
        let llm = Arc::new(AnthropicClient::new(&config));
        let web: Arc<dyn WebClient> = Arc::new(FirecrawlClient::new(&config));
        let tools = ToolRegistry::new(web);

        Self { config, llm, tools }
    }

    /// Create an agent over injected boundary clients (useful for testing).
    pub fn with_clients(
        config: Config,
        llm: Arc<dyn ModelClient>,
        web: Arc<dyn WebClient>,
    ) -> Self {
        let tools = ToolRegistry::new(web);
        Self { config, llm, tools }
    }

    /// Run one query to completion, emitting an event per transition, and
    /// return the final answer text.
    ///
    /// The conversation is owned by this call and discarded when it returns;
    /// no state survives across queries.
    pub async fn run(
        &self,
        query: &str,
        mut on_event: impl FnMut(&AgentEvent),
    ) -> Result<String, AgentError> {
        let system_prompt = build_system_prompt(&self.tools);
        let tool_schemas = self.tools.get_tool_schemas();

        let mut turns = vec![Turn::user_text(query)];
        let mut reasoning_count = 0usize;
        let mut tool_call_count = 0usize;

        on_event(&AgentEvent::Start {
            query: query.to_string(),
        });

        for turn in 0..self.config.max_turns {
            debug!("Agent turn {}", turn + 1);

            let blocks = self
                .llm
                .complete(&system_prompt, &turns, &tool_schemas)
                .await?;

            // A response containing a tool request ends the assistant's turn
            // at that request; any text alongside it is preliminary, not a
            // trusted final answer.
            let has_tool_use = blocks
                .iter()
                .any(|b| matches!(b, ContentBlock::ToolUse { .. }));

            let mut assistant_content: Vec<ContentBlock> = Vec::new();
            let mut dispatch: Option<(String, String, serde_json::Value)> = None;
            let mut final_answer = String::new();

            for block in blocks {
                match &block {
                    ContentBlock::Thinking { thinking, .. } => {
                        reasoning_count += 1;
                        on_event(&AgentEvent::Reasoning {
                            number: reasoning_count,
                            content: thinking.clone(),
                        });
                        assistant_content.push(block);
                    }
                    ContentBlock::Text { text } => {
                        if !has_tool_use {
                            if !final_answer.is_empty() {
                                final_answer.push('\n');
                            }
                            final_answer.push_str(text);
                        }
                        assistant_content.push(block);
                    }
                    ContentBlock::ToolUse { id, name, input } => {
                        tool_call_count += 1;
                        on_event(&AgentEvent::ToolCall {
                            number: tool_call_count,
                            tool: self.tools.display_name(name),
                            parameters: input.clone(),
                        });
                        dispatch = Some((id.clone(), name.clone(), input.clone()));
                        assistant_content.push(block);
                        // One tool result at a time: the assistant turn ends
                        // at the first tool request, and blocks after it are
                        // not replayed. A model wanting more tool calls
                        // re-issues them on the next turn, one round-trip
                        // each, after seeing this result.
                        break;
                    }
                    ContentBlock::ToolResult { .. } => {
                        debug!("Ignoring unexpected tool_result block in model response");
                    }
                }
            }

            if let Some((id, name, input)) = dispatch {
                let started = Instant::now();
                let outcome = self.tools.execute(&name, input).await;
                let duration_ms = started.elapsed().as_millis() as u64;

                on_event(&AgentEvent::ToolResult {
                    tool: self.tools.display_name(&name),
                    duration_ms,
                    result: outcome.text.clone(),
                    artifacts: outcome.artifacts,
                });

                turns.push(Turn::assistant(assistant_content));
                turns.push(Turn::tool_result(id, outcome.text));
                continue;
            }

            if final_answer.is_empty() {
                return Err(AgentError::EmptyResponse);
            }

            on_event(&AgentEvent::FinalAnswer {
                content: final_answer.clone(),
            });
            on_event(&AgentEvent::Summary {
                reasoning_count,
                tool_call_count,
            });
            return Ok(final_answer);
        }

        Err(AgentError::TurnLimit(self.config.max_turns))
    }
}
