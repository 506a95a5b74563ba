//! Error types for orchestrator operations.

use agent_core::ReasonerError;
use thiserror::Error;

/// Errors that end a turn.
///
/// Tool failures never appear here; they are folded into the conversation
/// as tool-result messages.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// The reasoning engine failed.
    #[error("reasoner error: {0}")]
    Reasoner(#[from] ReasonerError),

    /// The engine kept requesting tools past the configured cap.
    #[error("tool-call limit of {max_iterations} reasoning steps reached")]
    IterationLimit { max_iterations: usize },

    /// Invalid loop configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
