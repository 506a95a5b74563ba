//! Executing one batch of tool calls and folding the results into the state.

use agent_core::{ConversationState, Message, Payload, ToolCallRequest, ToolEnvelope};
use agent_tools::{RegistryToolExecutor, ToolError};
use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, warn};

/// What one tool call produced.
#[derive(Debug)]
pub(crate) enum CallOutcome {
    /// The adapter ran.
    Ran(ToolEnvelope),
    /// The tool is unknown or not allowed.
    NotImplemented,
    /// A required argument was missing or blank; the adapter was not invoked.
    MissingArgument(String),
}

impl CallOutcome {
    fn content(&self, name: &str) -> String {
        match self {
            Self::Ran(envelope) => envelope.tool_content(),
            Self::NotImplemented => not_implemented(name),
            Self::MissingArgument(message) => message.clone(),
        }
    }
}

pub(crate) fn not_implemented(name: &str) -> String {
    format!("Tool '{}' is not implemented.", name)
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Run one call: resolve the tool, check required arguments, invoke.
pub(crate) async fn run_call(executor: &RegistryToolExecutor, call: &ToolCallRequest) -> CallOutcome {
    let Some(tool) = executor.tool(&call.name) else {
        warn!("Reasoner requested unknown tool '{}'", call.name);
        return CallOutcome::NotImplemented;
    };

    let definition = tool.definition();
    if let Some(missing) = definition
        .required_parameters()
        .into_iter()
        .find(|param| is_blank(call.arguments.get(*param)))
    {
        debug!("Tool '{}' called without '{}'", call.name, missing);
        return CallOutcome::MissingArgument(tool.missing_argument_message(missing));
    }

    debug!("Invoking tool '{}' (call {})", call.name, call.call_id);

    match executor.execute(&call.name, call.arguments.clone()).await {
        Ok(envelope) => {
            if let Some(error) = envelope.error() {
                warn!("Tool '{}' reported an error: {}", call.name, error);
            }
            CallOutcome::Ran(envelope)
        }
        Err(ToolError::NotFound(_)) => CallOutcome::NotImplemented,
        Err(e) => CallOutcome::Ran(ToolEnvelope::failure(
            format!("Tool '{}' failed.", call.name),
            e.to_string(),
        )),
    }
}

/// Run a batch, sequentially or concurrently. Outcomes are in request order.
pub(crate) async fn run_batch(
    executor: &RegistryToolExecutor,
    calls: &[ToolCallRequest],
    parallel: bool,
) -> Vec<CallOutcome> {
    if parallel && calls.len() > 1 {
        info!("Running {} tool calls concurrently", calls.len());
        return join_all(calls.iter().map(|call| run_call(executor, call))).await;
    }

    let mut outcomes = Vec::with_capacity(calls.len());
    for call in calls {
        outcomes.push(run_call(executor, call).await);
    }
    outcomes
}

/// Append one tool-result message per call and accumulate side channels.
pub(crate) fn fold_outcomes(
    state: &mut ConversationState,
    calls: &[ToolCallRequest],
    outcomes: Vec<CallOutcome>,
) {
    for (call, outcome) in calls.iter().zip(outcomes) {
        state.push_message(Message::tool_result(
            call.call_id.clone(),
            outcome.content(&call.name),
        ));

        let CallOutcome::Ran(envelope) = outcome else {
            continue;
        };

        match envelope.into_payload() {
            Some(Payload::Attachments(attachments)) => state.add_attachments(attachments),
            Some(Payload::SeriesData(blocks)) => state.add_series_data(blocks),
            Some(Payload::Documents(documents)) => {
                let query = call.get_string("query").unwrap_or_default().trim();
                state.add_retrieval(query, documents);
            }
            _ => {}
        }
    }
}
