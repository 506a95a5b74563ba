//! Core traits and types shared by the agent crates.
//!
//! This crate defines the vocabulary every other crate speaks:
//!
//! - [`Reasoner`] - The trait for the external reasoning engine that decides,
//!   given the conversation and the tool table, whether to answer or to call tools
//! - [`Message`] / [`ToolCallRequest`] - Role-tagged conversation entries
//! - [`ToolDefinition`] - The function-calling schema handed to the engine
//! - [`ToolEnvelope`] - The uniform result shape returned by every tool adapter
//! - [`ConversationState`] - The per-turn accumulator for messages and side channels
//! - [`ReasonerError`] - Error type for reasoning-engine failures
//!
//! # Example
//!
//! ```rust
//! use agent_core::{async_trait, Message, Reasoner, ReasonerError, ToolDefinition};
//!
//! struct AlwaysAnswer;
//!
//! #[async_trait]
//! impl Reasoner for AlwaysAnswer {
//!     async fn next_action(
//!         &self,
//!         _history: &[Message],
//!         _tools: &[ToolDefinition],
//!     ) -> Result<Message, ReasonerError> {
//!         Ok(Message::assistant("Unemployment was 4.1% last month."))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "AlwaysAnswer"
//!     }
//! }
//! ```

mod envelope;
mod error;
mod message;
mod prompt;
mod state;
mod tools;
mod trait_def;

pub use envelope::{Payload, ToolEnvelope, TOOL_RESULT_MAX_DOCS};
pub use error::ReasonerError;
pub use message::{Message, Role, ToolCallRequest};
pub use prompt::hash_prompt;
pub use state::{
    format_documents, Attachment, ConversationState, DataBlock, DataPoint, Document, ReleaseDate,
};
pub use tools::{FunctionDefinition, ToolDefinition};
pub use trait_def::Reasoner;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
