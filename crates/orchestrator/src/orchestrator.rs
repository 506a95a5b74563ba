//! The tool-dispatch conversational loop.

use std::sync::Arc;

use agent_core::{hash_prompt, ConversationState, Message, Reasoner, ToolDefinition};
use agent_tools::RegistryToolExecutor;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::{LimitBehavior, OrchestratorConfig};
use crate::dispatch::{fold_outcomes, run_batch};
use crate::error::OrchestratorError;
use crate::prompt::render_system_prompt;
use crate::turn::{answer_text, TurnRequest, TurnResponse};

/// Answer returned when the engine still wants tools after the forced step.
pub const FORCED_ANSWER_FALLBACK: &str =
    "I gathered data for your question but could not finish an answer within the allowed number of tool calls.";

/// Drives one reasoner against the tool table until it answers.
///
/// Each turn alternates between asking the reasoner for its next action and
/// running the tool calls it requested. Every call gets exactly one
/// tool-result message, in request order, before the next reasoning step.
/// Tool failures are fed back as text; only reasoner failures (and the
/// iteration cap in `fail` mode) end the turn with an error.
pub struct Orchestrator<R: Reasoner> {
    reasoner: R,
    executor: Arc<RegistryToolExecutor>,
    config: OrchestratorConfig,
    prompt_hash: String,
}

impl<R: Reasoner> Orchestrator<R> {
    /// Create an orchestrator with the given components.
    pub fn new(reasoner: R, executor: RegistryToolExecutor, config: OrchestratorConfig) -> Self {
        Self::with_shared_executor(reasoner, Arc::new(executor), config)
    }

    /// Create an orchestrator sharing an executor with other owners.
    pub fn with_shared_executor(
        reasoner: R,
        executor: Arc<RegistryToolExecutor>,
        config: OrchestratorConfig,
    ) -> Self {
        let prompt_hash = hash_prompt(&config.system_prompt);
        info!(
            "Orchestrator initialized with reasoner: {}, tools: [{}], max_iterations: {}, on_limit: {}, parallel: {}",
            reasoner.name(),
            executor.supported_tools().join(", "),
            config.max_iterations,
            config.on_limit,
            config.parallel_tool_calls
        );
        info!("System prompt fingerprint: {}", prompt_hash);

        Self {
            reasoner,
            executor,
            config,
            prompt_hash,
        }
    }

    /// Get the reasoner.
    pub fn reasoner(&self) -> &R {
        &self.reasoner
    }

    /// Get the tool executor.
    pub fn executor(&self) -> &RegistryToolExecutor {
        &self.executor
    }

    /// Get the configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Fingerprint of the system prompt template.
    pub fn prompt_hash(&self) -> &str {
        &self.prompt_hash
    }

    /// Answer one request end-to-end.
    pub async fn process(&self, request: TurnRequest) -> Result<TurnResponse, OrchestratorError> {
        let preview: String = request.text.chars().take(100).collect();
        info!("Query from user {}: {}", request.user_id, preview);

        let mut state = ConversationState::with_history(request.to_messages());
        let response = self.run_turn(&mut state).await?;

        let (attachments, series_data) = state.into_outputs();
        info!(
            "Response sent to user {} ({} attachments, {} data blocks)",
            request.user_id,
            attachments.len(),
            series_data.len()
        );

        Ok(TurnResponse {
            response,
            attachments,
            series_data,
        })
    }

    /// Run the loop on `state` until the reasoner produces a final answer.
    ///
    /// Returns the answer text (`No response` when it is empty). The state
    /// keeps every message and side-channel output of the turn.
    pub async fn run_turn(&self, state: &mut ConversationState) -> Result<String, OrchestratorError> {
        let tools = self.executor.definitions();
        let mut tool_steps = 0;

        loop {
            let reply = self.next_action(state, &tools).await?;

            if !reply.has_tool_calls() {
                let answer = answer_text(&reply.content);
                state.push_message(reply);
                debug!("Turn finished after {} tool steps", tool_steps);
                return Ok(answer);
            }

            let calls = reply.tool_calls.clone();
            state.push_message(reply);

            let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
            info!("Reasoner requested {} tool calls: {:?}", calls.len(), names);

            let outcomes = run_batch(&self.executor, &calls, self.config.parallel_tool_calls).await;
            fold_outcomes(state, &calls, outcomes);

            tool_steps += 1;
            if tool_steps >= self.config.max_iterations {
                return self.on_limit(state).await;
            }
        }
    }

    async fn on_limit(&self, state: &mut ConversationState) -> Result<String, OrchestratorError> {
        let max_iterations = self.config.max_iterations;
        warn!(
            "Reached {} tool-calling steps, applying {}",
            max_iterations, self.config.on_limit
        );

        match self.config.on_limit {
            LimitBehavior::Fail => Err(OrchestratorError::IterationLimit { max_iterations }),
            LimitBehavior::ForceAnswer => {
                let reply = self.next_action(state, &[]).await?;
                if reply.has_tool_calls() {
                    warn!("Reasoner still requested tools with none offered");
                    state.push_message(Message::assistant(FORCED_ANSWER_FALLBACK));
                    return Ok(FORCED_ANSWER_FALLBACK.to_string());
                }

                let answer = answer_text(&reply.content);
                state.push_message(reply);
                Ok(answer)
            }
        }
    }

    async fn next_action(
        &self,
        state: &ConversationState,
        tools: &[ToolDefinition],
    ) -> Result<Message, OrchestratorError> {
        let system_prompt = render_system_prompt(
            &self.config.system_prompt,
            Utc::now(),
            state.retrieved_documents(),
        );

        let mut history = Vec::with_capacity(state.messages().len() + 1);
        history.push(Message::system(system_prompt));
        history.extend_from_slice(state.messages());

        debug!(
            "Asking {} for next action ({} messages, {} tools)",
            self.reasoner.name(),
            history.len(),
            tools.len()
        );

        self.reasoner
            .next_action(&history, tools)
            .await
            .map_err(|e| {
                warn!("Reasoner {} failed: {}", self.reasoner.name(), e);
                OrchestratorError::from(e)
            })
    }
}
