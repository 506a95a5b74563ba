//! Integration tests for the dispatch loop.
//!
//! The loop runs against the real tool adapters from `agent-tools`, backed by
//! in-memory FRED and document-index stubs, and a scripted reasoner from
//! `mock-brain`. No network access is needed.
//!
//! Run with:
//!   cargo test -p orchestrator --test dispatch_loop

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agent_core::{DataPoint, Document, ReleaseDate, Role, ToolEnvelope};
use agent_tools::clients::{ChartImage, FredRelease};
use agent_tools::{
    default_registry, DocumentIndex, FraserSource, FredApi, FredSource, IndexSource,
    RegistryToolExecutor, SeriesSnapshot, Tool, ToolArgs, ToolError, ToolRegistry,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use mock_brain::ScriptedBrain;
use orchestrator::{
    ConversationState, LimitBehavior, Message, Orchestrator, OrchestratorConfig,
    OrchestratorError, TurnRequest, FORCED_ANSWER_FALLBACK,
};
use serde_json::{json, Value};

// ============================================================================
// Stubs
// ============================================================================

/// Monthly 2024 observations `1.0..=8.0`; series `NANS` has a gap in August.
#[derive(Default)]
struct StubFred {
    snapshot_calls: AtomicUsize,
}

impl StubFred {
    fn calls(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }
}

fn month(m: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, 1).unwrap()
}

#[async_trait]
impl FredApi for StubFred {
    async fn series_snapshot(&self, series_id: &str, _limit: usize) -> Result<SeriesSnapshot, ToolError> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        if series_id == "MISSING" {
            return Err(ToolError::Upstream("Bad Request. The series does not exist.".to_string()));
        }

        let points = (1..=8)
            .map(|m| DataPoint {
                date: month(m),
                value: if series_id == "NANS" && m == 8 { f64::NAN } else { m as f64 },
            })
            .collect();
        Ok(SeriesSnapshot::new(series_id, format!("{} title", series_id), "Percent", "Monthly", points))
    }

    async fn chart_image(&self, series_id: &str) -> Result<ChartImage, ToolError> {
        Ok(ChartImage {
            url: format!("https://fred.stlouisfed.org/graph/fredgraph.png?id={}", series_id),
            bytes: vec![0x89, b'P', b'N', b'G'],
        })
    }

    async fn series_releases(&self, _series_id: &str) -> Result<Vec<FredRelease>, ToolError> {
        Err(ToolError::Upstream("not stubbed".to_string()))
    }

    async fn release_dates(&self, _release_id: u64) -> Result<Vec<ReleaseDate>, ToolError> {
        Err(ToolError::Upstream("not stubbed".to_string()))
    }

    async fn releases(&self, _limit: usize) -> Result<Vec<FredRelease>, ToolError> {
        Ok(Vec::new())
    }

    async fn release_series(&self, _release_id: u64, _limit: usize) -> Result<Value, ToolError> {
        Err(ToolError::Upstream("not stubbed".to_string()))
    }

    async fn release_tables(&self, _release_id: u64) -> Result<Value, ToolError> {
        Err(ToolError::Upstream("not stubbed".to_string()))
    }

    async fn search_series(&self, query: &str, limit: usize) -> Result<Vec<Value>, ToolError> {
        Ok((0..limit.min(2))
            .map(|i| json!({"id": format!("{}_{}", query.to_uppercase(), i)}))
            .collect())
    }
}

struct StubIndex;

#[async_trait]
impl DocumentIndex for StubIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Document>, ToolError> {
        Ok((0..top_k.min(4))
            .map(|i| Document::new(format!("{} passage {}", query, i)))
            .collect())
    }
}

/// Sleeps, then reports which call it was.
struct SlowEcho;

#[async_trait]
impl Tool for SlowEcho {
    fn name(&self) -> &str {
        "slow_echo"
    }

    fn description(&self) -> &str {
        "Echo after a delay."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"tag": {"type": "string"}, "delay_ms": {"type": "integer"}},
            "required": ["tag"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let tag = args.get_string("tag").unwrap_or_default();
        let delay = args.get_u64_or("delay_ms", 1).unwrap_or(1);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        ToolEnvelope::success(format!("echo {}", tag), agent_core::Payload::Results(Vec::new()))
    }
}

fn fred_executor(fred: Arc<StubFred>) -> RegistryToolExecutor {
    let registry = default_registry(
        FredSource::new(fred),
        FraserSource::unconfigured(),
        IndexSource::new(Arc::new(StubIndex), 5),
    );
    RegistryToolExecutor::new(registry)
}

fn tool_messages(state: &ConversationState) -> Vec<&Message> {
    state
        .messages()
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect()
}

// ============================================================================
// Dispatch
// ============================================================================

mod dispatch_tests {
    use super::*;

    #[tokio::test]
    async fn test_recent_data_and_chart_in_one_batch() {
        let fred = Arc::new(StubFred::default());
        let brain = ScriptedBrain::new()
            .then_calls(vec![
                ("call_data", "fred_recent_data", json!({"series_id": "UNRATE", "latest_points": 3})),
                ("call_chart", "fred_chart", json!({"series_id": "UNRATE"})),
            ])
            .then_answer("Unemployment rose to 8%.");
        let orchestrator =
            Orchestrator::new(brain, fred_executor(fred), OrchestratorConfig::default());

        let response = orchestrator
            .process(TurnRequest::new("Show me unemployment"))
            .await
            .unwrap();

        assert_eq!(response.response, "Unemployment rose to 8%.");

        assert_eq!(response.series_data.len(), 1);
        let dates: Vec<NaiveDate> = response.series_data[0].points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![month(6), month(7), month(8)]);

        assert_eq!(response.attachments.len(), 1);
        assert!(response.attachments[0]
            .source
            .starts_with("data:image/png;base64,"));
        assert_eq!(response.attachments[0].series_id, "UNRATE");

        // The second reasoning step saw both results, in request order.
        let calls = orchestrator.reasoner().calls().await;
        assert_eq!(calls.len(), 2);
        let results: Vec<&Message> = calls[1].history.iter().filter(|m| m.role == Role::Tool).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tool_call_id.as_deref(), Some("call_data"));
        assert_eq!(results[1].tool_call_id.as_deref(), Some("call_chart"));
        assert!(results[0].content.contains("\"series_id\": \"UNRATE\""));
        assert!(!results[1].content.contains("base64"));
    }

    #[tokio::test]
    async fn test_missing_value_dropped_before_truncation() {
        let fred = Arc::new(StubFred::default());
        let brain = ScriptedBrain::new()
            .then_call("c1", "fred_recent_data", json!({"series_id": "NANS", "latest_points": 3}))
            .then_answer("done");
        let orchestrator =
            Orchestrator::new(brain, fred_executor(fred), OrchestratorConfig::default());

        let response = orchestrator.process(TurnRequest::new("q")).await.unwrap();
        let dates: Vec<NaiveDate> = response.series_data[0].points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![month(5), month(6), month(7)]);
    }

    #[tokio::test]
    async fn test_missing_argument_skips_adapter() {
        let fred = Arc::new(StubFred::default());
        let brain = ScriptedBrain::new()
            .then_call("c1", "fred_recent_data", json!({"series_id": ""}))
            .then_answer("Which series?");
        let orchestrator =
            Orchestrator::new(brain, fred_executor(fred.clone()), OrchestratorConfig::default());

        let mut state = ConversationState::with_history(vec![Message::user("data please")]);
        let answer = orchestrator.run_turn(&mut state).await.unwrap();

        assert_eq!(answer, "Which series?");
        assert_eq!(fred.calls(), 0);
        let results = tool_messages(&state);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].content,
            "A FRED series_id is required to fetch recent data."
        );
    }

    #[tokio::test]
    async fn test_adapter_failure_does_not_end_turn() {
        let fred = Arc::new(StubFred::default());
        let brain = ScriptedBrain::new()
            .then_call("c1", "fred_chart", json!({"series_id": "MISSING"}))
            .then_answer("That series does not exist.");
        let orchestrator =
            Orchestrator::new(brain, fred_executor(fred), OrchestratorConfig::default());

        let mut state = ConversationState::with_history(vec![Message::user("chart MISSING")]);
        let answer = orchestrator.run_turn(&mut state).await.unwrap();

        assert_eq!(answer, "That series does not exist.");
        let results = tool_messages(&state);
        assert!(results[0].content.starts_with("Failed to generate chart for MISSING."));
        assert!(results[0].content.contains("\nError: "));
        assert!(state.attachments().is_empty());
    }

    #[tokio::test]
    async fn test_result_count_matches_request_count() {
        let fred = Arc::new(StubFred::default());
        let brain = ScriptedBrain::new()
            .then_calls(vec![
                ("a", "fred_search_series", json!({"query": "mortgage"})),
                ("b", "no_such_tool", json!({})),
                ("c", "fraser_search_fomc_titles", json!({"query": "January 2010"})),
                ("d", "retrieve_documents", json!({})),
            ])
            .then_answer("ok");
        let orchestrator =
            Orchestrator::new(brain, fred_executor(fred), OrchestratorConfig::default());

        let mut state = ConversationState::with_history(vec![Message::user("q")]);
        orchestrator.run_turn(&mut state).await.unwrap();

        let results = tool_messages(&state);
        let ids: Vec<&str> = results.iter().filter_map(|m| m.tool_call_id.as_deref()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert!(results[0].content.starts_with("Found 2 FRED series matching 'mortgage'."));
        assert_eq!(results[1].content, "Tool 'no_such_tool' is not implemented.");
        assert!(results[2].content.contains("FRASER_API_KEY"));
        assert_eq!(results[3].content, "No query provided to retrieval tool.");
    }

    #[tokio::test]
    async fn test_identical_calls_give_identical_results() {
        let fred = Arc::new(StubFred::default());
        let brain = ScriptedBrain::new()
            .then_call("a", "fred_recent_data", json!({"series_id": "GDP", "latest_points": 4}))
            .then_call("b", "fred_recent_data", json!({"series_id": "GDP", "latest_points": 4}))
            .then_answer("ok");
        let orchestrator =
            Orchestrator::new(brain, fred_executor(fred), OrchestratorConfig::default());

        let mut state = ConversationState::with_history(vec![Message::user("q")]);
        orchestrator.run_turn(&mut state).await.unwrap();

        let results = tool_messages(&state);
        assert_eq!(results[0].content, results[1].content);
        // Side channels accumulate across steps.
        assert_eq!(state.series_data().len(), 2);
        assert_eq!(state.series_data()[0], state.series_data()[1]);
    }

    #[tokio::test]
    async fn test_retrieval_feeds_next_system_prompt() {
        let fred = Arc::new(StubFred::default());
        let brain = ScriptedBrain::new()
            .then_call("r1", "retrieve_documents", json!({"query": "inflation outlook"}))
            .then_answer("Inflation is expected to ease.");
        let orchestrator =
            Orchestrator::new(brain, fred_executor(fred), OrchestratorConfig::default());

        let mut state = ConversationState::with_history(vec![Message::user("outlook?")]);
        orchestrator.run_turn(&mut state).await.unwrap();

        assert_eq!(state.issued_queries(), ["inflation outlook".to_string()]);
        assert_eq!(state.retrieved_documents().len(), 4);

        let results = tool_messages(&state);
        assert_eq!(results[0].content.matches("<document>").count(), 3);

        let calls = orchestrator.reasoner().calls().await;
        assert!(!calls[0].history[0].content.contains("inflation outlook passage 0"));
        assert!(calls[1].history[0].content.contains("inflation outlook passage 3"));
    }
}

// ============================================================================
// Iteration cap
// ============================================================================

mod limit_tests {
    use super::*;

    fn looping_brain(steps: usize) -> ScriptedBrain {
        (0..steps).fold(ScriptedBrain::new(), |brain, i| {
            brain.then_call(&format!("c{}", i), "fred_search_series", json!({"query": "gdp"}))
        })
    }

    #[tokio::test]
    async fn test_force_answer_asks_without_tools() {
        let brain = looping_brain(2).then_answer("GDP grew.");
        let config = OrchestratorConfig::builder().max_iterations(2).build();
        let orchestrator =
            Orchestrator::new(brain, fred_executor(Arc::new(StubFred::default())), config);

        let response = orchestrator.process(TurnRequest::new("gdp?")).await.unwrap();
        assert_eq!(response.response, "GDP grew.");

        let calls = orchestrator.reasoner().calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].tool_names.len(), 7);
        assert!(calls[2].tool_names.is_empty());
    }

    #[tokio::test]
    async fn test_force_answer_fallback_when_still_calling() {
        let brain = looping_brain(5);
        let config = OrchestratorConfig::builder().max_iterations(2).build();
        let orchestrator =
            Orchestrator::new(brain, fred_executor(Arc::new(StubFred::default())), config);

        let mut state = ConversationState::with_history(vec![Message::user("gdp?")]);
        let answer = orchestrator.run_turn(&mut state).await.unwrap();

        assert_eq!(answer, FORCED_ANSWER_FALLBACK);
        assert_eq!(orchestrator.reasoner().call_count().await, 3);
        // Every request that was dispatched got its result.
        assert_eq!(tool_messages(&state).len(), 2);
        assert_eq!(state.last_message().unwrap().content, FORCED_ANSWER_FALLBACK);
    }

    #[tokio::test]
    async fn test_fail_mode_returns_error() {
        let brain = looping_brain(5);
        let config = OrchestratorConfig::builder()
            .max_iterations(3)
            .on_limit(LimitBehavior::Fail)
            .build();
        let orchestrator =
            Orchestrator::new(brain, fred_executor(Arc::new(StubFred::default())), config);

        let result = orchestrator.process(TurnRequest::new("gdp?")).await;
        match result {
            Err(OrchestratorError::IterationLimit { max_iterations }) => assert_eq!(max_iterations, 3),
            other => panic!("expected IterationLimit, got {:?}", other.map(|r| r.response)),
        }
        assert_eq!(orchestrator.reasoner().call_count().await, 3);
    }
}

// ============================================================================
// Parallel batches
// ============================================================================

mod parallel_tests {
    use super::*;

    fn slow_executor() -> RegistryToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(SlowEcho);
        RegistryToolExecutor::new(registry)
    }

    #[tokio::test]
    async fn test_parallel_results_keep_request_order() {
        let brain = ScriptedBrain::new()
            .then_calls(vec![
                ("first", "slow_echo", json!({"tag": "one", "delay_ms": 80})),
                ("second", "slow_echo", json!({"tag": "two", "delay_ms": 1})),
                ("third", "slow_echo", json!({"tag": "three", "delay_ms": 40})),
            ])
            .then_answer("ok");
        let config = OrchestratorConfig::builder().parallel_tool_calls(true).build();
        let orchestrator = Orchestrator::new(brain, slow_executor(), config);

        let mut state = ConversationState::with_history(vec![Message::user("go")]);
        orchestrator.run_turn(&mut state).await.unwrap();

        let results = tool_messages(&state);
        let ids: Vec<&str> = results.iter().filter_map(|m| m.tool_call_id.as_deref()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
        assert!(results[0].content.starts_with("echo one"));
        assert!(results[1].content.starts_with("echo two"));
        assert!(results[2].content.starts_with("echo three"));
    }

    #[tokio::test]
    async fn test_sequential_and_parallel_agree() {
        let script = || {
            ScriptedBrain::new()
                .then_calls(vec![
                    ("a", "slow_echo", json!({"tag": "a", "delay_ms": 20})),
                    ("b", "slow_echo", json!({"tag": "b"})),
                ])
                .then_answer("ok")
        };

        let mut contents = Vec::new();
        for parallel in [false, true] {
            let config = OrchestratorConfig::builder().parallel_tool_calls(parallel).build();
            let orchestrator = Orchestrator::new(script(), slow_executor(), config);
            let mut state = ConversationState::with_history(vec![Message::user("go")]);
            orchestrator.run_turn(&mut state).await.unwrap();
            contents.push(
                tool_messages(&state)
                    .iter()
                    .map(|m| m.content.clone())
                    .collect::<Vec<_>>(),
            );
        }

        assert_eq!(contents[0], contents[1]);
    }
}
