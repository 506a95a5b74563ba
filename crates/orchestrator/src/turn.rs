//! Inbound request and outbound response of one conversational turn.

use agent_core::{Attachment, DataBlock, Message, Role};
use serde::{Deserialize, Serialize};

/// Answer used when the engine finishes with empty text.
pub const EMPTY_ANSWER: &str = "No response";

/// One prior exchange entry supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: String,
    pub content: String,
}

impl ConversationEntry {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

fn default_user() -> String {
    "default_user".to_string()
}

/// A user question plus optional prior conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRequest {
    /// The new user message.
    pub text: String,
    /// Earlier user/assistant exchanges, oldest first.
    #[serde(default)]
    pub conversation: Vec<ConversationEntry>,
    /// Caller identity, used for logging only.
    #[serde(default = "default_user")]
    pub user_id: String,
}

impl TurnRequest {
    /// A request with no prior conversation.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            conversation: Vec::new(),
            user_id: default_user(),
        }
    }

    /// Attach prior conversation.
    pub fn with_conversation(mut self, conversation: Vec<ConversationEntry>) -> Self {
        self.conversation = conversation;
        self
    }

    /// Set the caller identity.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Prior conversation followed by the new user message.
    ///
    /// Entries with roles other than `user` and `assistant` are dropped.
    pub fn to_messages(&self) -> Vec<Message> {
        let mut messages: Vec<Message> = self
            .conversation
            .iter()
            .filter_map(|entry| match Role::from_conversation(&entry.role)? {
                Role::User => Some(Message::user(entry.content.clone())),
                Role::Assistant => Some(Message::assistant(entry.content.clone())),
                _ => None,
            })
            .collect();

        messages.push(Message::user(self.text.clone()));
        messages
    }
}

/// The assembled answer for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    pub response: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series_data: Vec<DataBlock>,
}

impl TurnResponse {
    /// A text-only response.
    pub fn text(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            attachments: Vec::new(),
            series_data: Vec::new(),
        }
    }
}

/// Replace a blank answer with [`EMPTY_ANSWER`].
pub(crate) fn answer_text(content: &str) -> String {
    if content.trim().is_empty() {
        EMPTY_ANSWER.to_string()
    } else {
        content.to_string()
    }
}
