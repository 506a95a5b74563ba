//! Chat-completions reasoner.
//!
//! This crate provides [`ChatBrain`], a [`Reasoner`] backed by any
//! OpenAI-compatible `/v1/chat/completions` endpoint with function calling.
//! The brain holds no conversation state of its own; each call receives the
//! whole history plus the tool table and returns the model's next move.
//!
//! # Features
//!
//! - Tool definitions are forwarded as `tools`; omitted when the table is empty
//! - Tool calls in the reply become [`agent_core::ToolCallRequest`]s
//! - Malformed argument JSON degrades to an empty argument map
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use chat_brain::{ChatBrain, Message, Reasoner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = ChatBrain::from_env()?;
//!     let reply = brain.next_action(&[Message::user("Hello")], &[]).await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::ChatBrain;
pub use config::{ChatBrainConfig, ChatBrainConfigBuilder, DEFAULT_API_URL, DEFAULT_MODEL};

// Re-export agent-core types for convenience
pub use agent_core::{async_trait, Message, Reasoner, ReasonerError, ToolDefinition};
