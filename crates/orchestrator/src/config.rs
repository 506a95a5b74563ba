//! Dispatch-loop configuration.

use std::env;
use std::fmt;
use std::str::FromStr;

use crate::error::OrchestratorError;
use crate::prompt::{load_system_prompt, DEFAULT_SYSTEM_PROMPT};

/// Default cap on reasoning steps that request tools within one turn.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// What to do when the engine is still requesting tools at the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LimitBehavior {
    /// Ask once more with no tools offered and return that text.
    #[default]
    ForceAnswer,
    /// End the turn with [`OrchestratorError::IterationLimit`].
    Fail,
}

impl FromStr for LimitBehavior {
    type Err = OrchestratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "force-answer" | "force_answer" | "answer" => Ok(Self::ForceAnswer),
            "fail" | "error" => Ok(Self::Fail),
            other => Err(OrchestratorError::Configuration(format!(
                "AGENT_ON_LIMIT must be 'force-answer' or 'fail', got '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for LimitBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForceAnswer => f.write_str("force-answer"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Configuration for the dispatch loop.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Reasoning steps with tool calls allowed per turn.
    pub max_iterations: usize,

    /// Behavior once `max_iterations` is reached.
    pub on_limit: LimitBehavior,

    /// Run the calls of one batch concurrently.
    pub parallel_tool_calls: bool,

    /// System prompt template.
    pub system_prompt: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            on_limit: LimitBehavior::default(),
            parallel_tool_calls: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `AGENT_MAX_ITERATIONS` - Tool-calling steps per turn (default: 10)
    /// - `AGENT_ON_LIMIT` - `force-answer` or `fail` (default: force-answer)
    /// - `AGENT_PARALLEL_TOOLS` - Run one batch concurrently (default: false)
    /// - `AGENT_SYSTEM_PROMPT` / `AGENT_PROMPT_FILE` - Prompt override
    pub fn from_env() -> Result<Self, OrchestratorError> {
        let max_iterations = match env::var("AGENT_MAX_ITERATIONS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let value: usize = raw.trim().parse().map_err(|_| {
                    OrchestratorError::Configuration(format!(
                        "AGENT_MAX_ITERATIONS must be a positive integer, got '{}'",
                        raw
                    ))
                })?;
                if value == 0 {
                    return Err(OrchestratorError::Configuration(
                        "AGENT_MAX_ITERATIONS must be at least 1".to_string(),
                    ));
                }
                value
            }
            _ => DEFAULT_MAX_ITERATIONS,
        };

        let on_limit = match env::var("AGENT_ON_LIMIT") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => LimitBehavior::default(),
        };

        let parallel_tool_calls = env::var("AGENT_PARALLEL_TOOLS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            max_iterations,
            on_limit,
            parallel_tool_calls,
            system_prompt: load_system_prompt(),
        })
    }

    /// Create a new config builder.
    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}

/// Builder for OrchestratorConfig.
#[derive(Debug, Default)]
pub struct OrchestratorConfigBuilder {
    config: OrchestratorConfig,
}

impl OrchestratorConfigBuilder {
    /// Set the per-turn cap on tool-calling steps (at least 1).
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max.max(1);
        self
    }

    /// Set the behavior at the cap.
    pub fn on_limit(mut self, behavior: LimitBehavior) -> Self {
        self.config.on_limit = behavior;
        self
    }

    /// Enable or disable concurrent batches.
    pub fn parallel_tool_calls(mut self, enabled: bool) -> Self {
        self.config.parallel_tool_calls = enabled;
        self
    }

    /// Set the system prompt template.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Build the configuration.
    pub fn build(self) -> OrchestratorConfig {
        self.config
    }
}
