//! Tool-dispatch conversational loop for the economic-data agent.
//!
//! This crate provides the [`Orchestrator`] type which alternates between a
//! [`agent_core::Reasoner`] and the tool executor from `agent-tools` until
//! the reasoner produces a final answer.
//!
//! # Features
//!
//! - Renders the economics-assistant system prompt before every step
//! - Answers every tool call with exactly one tool-result, in request order
//! - Corrects unknown tools and missing arguments without invoking adapters
//! - Accumulates chart attachments, data blocks and retrieved documents
//! - Bounds the number of tool-calling steps per turn
//! - Optionally runs the calls of one batch concurrently
//!
//! # Architecture
//!
//! ```text
//! TurnRequest {text, conversation}
//!          ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Seed ConversationState with prior turns + user text     │
//! │         ↓                                                   │
//! │  2. Ask reasoner: [system prompt] + messages, tool table    │
//! │         ↓                                                   │
//! │  3. Tool calls?                                             │
//! │     • yes → run batch, append tool results, fold payloads,  │
//! │             back to 2 (until max_iterations)                │
//! │     • no  → final answer                                    │
//! └─────────────────────────────────────────────────────────────┘
//!          ↓
//! TurnResponse {response, attachments, series_data}
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_tools::{executor_from_config, ToolsConfig};
//! use chat_brain::ChatBrain;
//! use orchestrator::{Orchestrator, OrchestratorConfig, TurnRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = ChatBrain::from_env()?;
//!     let executor = executor_from_config(&ToolsConfig::from_env())?;
//!     let orchestrator = Orchestrator::new(brain, executor, OrchestratorConfig::from_env()?);
//!
//!     let response = orchestrator
//!         .process(TurnRequest::new("Chart the unemployment rate"))
//!         .await?;
//!     println!("{}", response.response);
//!     Ok(())
//! }
//! ```

mod config;
mod dispatch;
mod error;
mod orchestrator;
mod prompt;
mod turn;

// Public exports
pub use config::{
    LimitBehavior, OrchestratorConfig, OrchestratorConfigBuilder, DEFAULT_MAX_ITERATIONS,
};
pub use error::OrchestratorError;
pub use orchestrator::{Orchestrator, FORCED_ANSWER_FALLBACK};
pub use prompt::{
    load_system_prompt, popular_series_text, render_system_prompt, DEFAULT_PROMPT_FILE,
    DEFAULT_SYSTEM_PROMPT, POPULAR_SERIES,
};
pub use turn::{ConversationEntry, TurnRequest, TurnResponse, EMPTY_ANSWER};

// Re-export commonly used types from dependencies
pub use agent_core::{Attachment, ConversationState, DataBlock, Message, Reasoner};
pub use agent_tools::{RegistryToolExecutor, ToolRegistry};
