//! Scripted reasoner - replays a queue of prepared replies.

use std::collections::VecDeque;
use std::time::Duration;

use agent_core::{Message, Reasoner, ReasonerError, ToolCallRequest, ToolDefinition};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

/// One prepared reply.
#[derive(Debug)]
enum Step {
    Reply(Message),
    Fail(ReasonerError),
}

/// What the reasoner was shown on one call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Full history passed in.
    pub history: Vec<Message>,
    /// Names of the tools offered, in order.
    pub tool_names: Vec<String>,
}

/// A reasoner that returns queued replies in order and records every call.
///
/// Once the queue is drained it answers with the fallback text, so a test
/// scripting only tool calls still terminates.
pub struct ScriptedBrain {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<RecordedCall>>,
    fallback: String,
    delay: Option<Duration>,
}

impl Default for ScriptedBrain {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedBrain {
    /// Create an empty script.
    pub fn new() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            fallback: "Done.".to_string(),
            delay: None,
        }
    }

    /// Queue a reply requesting a single tool call.
    pub fn then_call(self, call_id: &str, tool: &str, arguments: Value) -> Self {
        self.then_calls(vec![(call_id, tool, arguments)])
    }

    /// Queue a reply requesting several tool calls at once.
    pub fn then_calls(self, calls: Vec<(&str, &str, Value)>) -> Self {
        let requests = calls
            .into_iter()
            .map(|(id, name, args)| ToolCallRequest::new(id, name, into_map(args)))
            .collect();
        self.then_reply(Message::assistant_with_tool_calls("", requests))
    }

    /// Queue a final answer.
    pub fn then_answer(self, text: impl Into<String>) -> Self {
        self.then_reply(Message::assistant(text))
    }

    /// Queue an arbitrary reply.
    pub fn then_reply(mut self, message: Message) -> Self {
        self.steps.get_mut().push_back(Step::Reply(message));
        self
    }

    /// Queue a failure.
    pub fn then_fail(mut self, error: ReasonerError) -> Self {
        self.steps.get_mut().push_back(Step::Fail(error));
        self
    }

    /// Text answered once the script is exhausted.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = text.into();
        self
    }

    /// Sleep before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls received so far.
    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    /// Number of calls received so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Replies still queued.
    pub async fn remaining(&self) -> usize {
        self.steps.lock().await.len()
    }
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[async_trait]
impl Reasoner for ScriptedBrain {
    async fn next_action(
        &self,
        history: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<Message, ReasonerError> {
        self.calls.lock().await.push(RecordedCall {
            history: history.to_vec(),
            tool_names: tools.iter().map(|t| t.name().to_string()).collect(),
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.steps.lock().await.pop_front() {
            Some(Step::Reply(message)) => Ok(message),
            Some(Step::Fail(error)) => Err(error),
            None => Ok(Message::assistant(self.fallback.clone())),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}
