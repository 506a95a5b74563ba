//! Error types for tool operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while dispatching to or running a tool.
///
/// Adapters never return these to the dispatch loop; they are caught at the
/// adapter boundary and folded into an error envelope.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool not found in registry (or not allowed by policy).
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Missing required parameter.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Invalid parameter value.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// HTTP request failed (connect, timeout, or non-success status).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The upstream answered, but with nothing usable.
    #[error("{0}")]
    Upstream(String),

    /// A credential or endpoint the tool needs is not configured.
    #[error("{0}")]
    Configuration(String),

    /// The invocation exceeded its time budget.
    #[error("Tool execution timed out after {0:?}")]
    Timeout(Duration),
}
