//! Agent module - the loop driving the reasoning model over the tools.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build context with system prompt and the user query
//! 2. Call the model with the tool schema catalogue and interleaved thinking
//! 3. If the model requests a tool, execute it and feed the result back
//! 4. Repeat until the model volunteers a final answer

mod agent_loop;
mod prompt;

pub use agent_loop::{Agent, AgentError};
pub use prompt::build_system_prompt;
