//! Echo reasoner - answers with the latest user message.

use agent_core::{Message, Reasoner, ReasonerError, Role, ToolDefinition};
use async_trait::async_trait;

/// A reasoner that never calls tools and echoes the last user message.
///
/// Useful for testing the request/response path without any model.
#[derive(Debug, Clone, Default)]
pub struct EchoBrain {
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoBrain {
    /// Create a new EchoBrain with no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new EchoBrain with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mock_brain::EchoBrain;
    ///
    /// let brain = EchoBrain::with_prefix("Echo: ");
    /// // Will answer with "Echo: <last user message>"
    /// ```
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl Reasoner for EchoBrain {
    async fn next_action(
        &self,
        history: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<Message, ReasonerError> {
        let text = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let answer = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, text),
            None => text.to_string(),
        };

        Ok(Message::assistant(answer))
    }

    fn name(&self) -> &str {
        "EchoBrain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_no_prefix() {
        let brain = EchoBrain::new();
        let history = vec![Message::system("sys"), Message::user("Hello!")];

        let reply = brain.next_action(&history, &[]).await.unwrap();
        assert_eq!(reply.content, "Hello!");
        assert_eq!(reply.role, Role::Assistant);
        assert!(!reply.has_tool_calls());
    }

    #[tokio::test]
    async fn test_echo_with_prefix_uses_latest_user_message() {
        let brain = EchoBrain::with_prefix("Echo: ");
        let history = vec![
            Message::user("first"),
            Message::assistant("ok"),
            Message::user("second"),
        ];

        let reply = brain.next_action(&history, &[]).await.unwrap();
        assert_eq!(reply.content, "Echo: second");
    }

    #[tokio::test]
    async fn test_echo_empty_history() {
        let reply = EchoBrain::new().next_action(&[], &[]).await.unwrap();
        assert!(reply.content.is_empty());
    }

    #[tokio::test]
    async fn test_brain_name_and_ready() {
        let brain = EchoBrain::new();
        assert_eq!(brain.name(), "EchoBrain");
        assert!(brain.is_ready().await);
    }
}
