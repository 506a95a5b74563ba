//! Mock reasoners for exercising the agent loop.
//!
//! This crate provides implementations of the `Reasoner` trait for testing:
//! - `ScriptedBrain` - Replays prepared tool calls and answers, recording what it was shown
//! - `EchoBrain` - Answers with the latest user message
//!
//! For production reasoning, use the `chat-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Message, Reasoner, ScriptedBrain};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::ReasonerError> {
//!     let brain = ScriptedBrain::new()
//!         .then_call("call_1", "fred_recent_data", json!({"series_id": "UNRATE"}))
//!         .then_answer("Unemployment was 4.1%.");
//!
//!     let first = brain.next_action(&[Message::user("Unemployment?")], &[]).await?;
//!     assert!(first.has_tool_calls());
//!     Ok(())
//! }
//! ```

mod echo;
mod scripted;

// Re-export agent-core types for convenience
pub use agent_core::{async_trait, Message, Reasoner, ReasonerError, ToolDefinition};

// Export mock implementations
pub use echo::EchoBrain;
pub use scripted::{RecordedCall, ScriptedBrain};
