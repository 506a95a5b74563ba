//! Error types for reasoning-engine operations.

use thiserror::Error;

/// Errors that can occur while asking the reasoning engine for its next action.
#[derive(Debug, Error)]
pub enum ReasonerError {
    /// The engine is misconfigured (missing key, bad URL, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request never reached the engine or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The engine answered, but not with something usable.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The engine is temporarily unavailable.
    #[error("reasoner unavailable: {0}")]
    Unavailable(String),

    /// A timeout occurred while waiting for the engine.
    #[error("reasoner timed out")]
    Timeout,
}
