//! The uniform result shape returned by every tool adapter.

use serde::Serialize;
use serde_json::Value;

use crate::state::{format_documents, Attachment, DataBlock, Document, ReleaseDate};

/// Maximum number of documents rendered into a retrieval tool result.
pub const TOOL_RESULT_MAX_DOCS: usize = 3;

/// Tool-specific payload carried by a successful envelope.
///
/// Serialized flattened into the envelope, so a chart result looks like
/// `{"message": "...", "attachments": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    /// Chart images.
    Attachments(Vec<Attachment>),
    /// Structured time-series data.
    SeriesData(Vec<DataBlock>),
    /// Release calendar entries.
    ReleaseSchedule(Vec<ReleaseDate>),
    /// Release metadata plus table structure, passed through from upstream.
    ReleaseStructure(Value),
    /// Upstream search hits, passed through verbatim.
    Results(Vec<Value>),
    /// Ranked documents from the knowledge index.
    Documents(Vec<Document>),
}

impl Payload {
    fn to_pretty_json(&self) -> serde_json::Result<String> {
        match self {
            Self::Attachments(items) => serde_json::to_string_pretty(items),
            Self::SeriesData(items) => serde_json::to_string_pretty(items),
            Self::ReleaseSchedule(items) => serde_json::to_string_pretty(items),
            Self::ReleaseStructure(value) => serde_json::to_string_pretty(value),
            Self::Results(items) => serde_json::to_string_pretty(items),
            Self::Documents(items) => serde_json::to_string_pretty(items),
        }
    }
}

/// Result of one tool invocation: `{message, error?, <payload>?}`.
///
/// Constructed only through [`ToolEnvelope::success`] and
/// [`ToolEnvelope::failure`], so an envelope carrying an error never carries
/// a payload, and the message is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolEnvelope {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(flatten)]
    payload: Option<Payload>,
}

impl ToolEnvelope {
    /// A successful result with its payload.
    pub fn success(message: impl Into<String>, payload: Payload) -> Self {
        Self {
            message: non_empty(message.into(), "Tool completed."),
            error: None,
            payload: Some(payload),
        }
    }

    /// A failed result. The error detail is kept separate from the
    /// human-readable message.
    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: non_empty(message.into(), "Tool failed."),
            error: Some(non_empty(error.into(), "unknown error")),
            payload: None,
        }
    }

    /// Human-readable summary.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Error detail, if the invocation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the invocation failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Payload of a successful invocation.
    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    /// Consume the envelope, yielding its payload.
    pub fn into_payload(self) -> Option<Payload> {
        self.payload
    }

    /// Render the content of the tool-result message fed back to the engine.
    ///
    /// Chart images are never inlined; documents are rendered as compact text
    /// (at most [`TOOL_RESULT_MAX_DOCS`]); other payloads are appended as
    /// pretty-printed JSON.
    pub fn tool_content(&self) -> String {
        if let Some(ref error) = self.error {
            return format!("{}\nError: {}", self.message, error);
        }

        match &self.payload {
            None | Some(Payload::Attachments(_)) => self.message.clone(),
            Some(Payload::Documents(docs)) if docs.is_empty() => {
                format!("{}\nNo documents were retrieved.", self.message)
            }
            Some(Payload::Documents(docs)) => {
                let shown = &docs[..docs.len().min(TOOL_RESULT_MAX_DOCS)];
                format!("{}\n{}", self.message, format_documents(shown))
            }
            Some(payload) => match payload.to_pretty_json() {
                Ok(json) => format!("{}\n{}", self.message, json),
                Err(_) => self.message.clone(),
            },
        }
    }
}

fn non_empty(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
