//! The Reasoner trait definition.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ReasonerError;
use crate::message::Message;
use crate::tools::ToolDefinition;

/// The external reasoning engine that drives the dispatch loop.
///
/// Given the full message history and the tool table, the engine returns one
/// assistant message. If that message carries tool-call requests the loop
/// executes them and asks again; otherwise its text is the final answer.
///
/// This trait is object-safe and can be used with `Arc<dyn Reasoner>`.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// Decide the next action for the conversation.
    ///
    /// # Arguments
    ///
    /// * `history` - Every message so far, system prompt first.
    /// * `tools` - The tools the engine may call. Empty means "answer now".
    async fn next_action(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, ReasonerError>;

    /// Get a human-readable name for this implementation.
    fn name(&self) -> &str;

    /// Check if the engine is ready to take requests.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}

#[async_trait]
impl<R: Reasoner + ?Sized> Reasoner for Arc<R> {
    async fn next_action(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, ReasonerError> {
        (**self).next_action(history, tools).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    async fn is_ready(&self) -> bool {
        (**self).is_ready().await
    }
}
