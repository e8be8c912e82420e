//! # deepscout
//!
//! An agentic web research loop: given a natural-language query, a reasoning
//! model is driven through think / call-a-tool / observe-result steps, where
//! the tools are web search, deep scraping and pure content analysis, until
//! the model volunteers a final textual answer.
//!
//! ## Architecture
//!
//! - [`agent`] owns the conversation state machine and emits one
//!   [`events::AgentEvent`] per transition.
//! - [`tools`] executes model-requested actions and never fails: every
//!   upstream error becomes explanatory text the model can react to.
//! - [`llm`] and [`scrape`] are the two external boundaries, each behind a
//!   trait with a real client and a scripted mock.
//!
//! ## Example
//!
//! ```rust,ignore
//! use deepscout::{config::Config, agent::Agent, events};
//!
//! let config = Config::from_env()?;
//! let agent = Agent::new(config);
//! let answer = agent
//!     .run("latest AI news", |event| {
//!         print!("{}", events::render_line(event));
//!     })
//!     .await?;
//! ```

pub mod agent;
pub mod config;
pub mod events;
pub mod llm;
pub mod scrape;
pub mod tools;

pub use agent::Agent;
pub use config::Config;
