//! FRED catalog search.

use agent_core::{Payload, ToolEnvelope};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::FredSource;
use crate::tool::{Tool, ToolArgs};
use crate::tools::object_schema;

/// Results returned when the engine does not pass a limit.
pub const DEFAULT_SEARCH_LIMIT: u64 = 5;

/// Searches the FRED catalog and returns the top hits verbatim.
pub struct FredSearchSeries {
    source: FredSource,
}

impl FredSearchSeries {
    pub fn new(source: FredSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for FredSearchSeries {
    fn name(&self) -> &str {
        "fred_search_series"
    }

    fn description(&self) -> &str {
        "Search the FRED catalog for series matching a text query."
    }

    fn parameters(&self) -> Value {
        object_schema(
            json!({
                "query": {
                    "type": "string",
                    "description": "Search text to find FRED series."
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of series to return (default 5).",
                    "minimum": 1
                }
            }),
            &["query"],
        )
    }

    fn missing_argument_message(&self, _parameter: &str) -> String {
        "A search query is required to search FRED series.".to_string()
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let query = match args.get_string("query") {
            Ok(q) => q,
            Err(e) => {
                return ToolEnvelope::failure(self.missing_argument_message("query"), e.to_string())
            }
        };
        let limit = match args.get_u64_or("limit", DEFAULT_SEARCH_LIMIT) {
            Ok(n) => n as usize,
            Err(e) => {
                return ToolEnvelope::failure(
                    format!("Invalid limit for FRED search '{}'.", query),
                    e.to_string(),
                )
            }
        };

        debug!("Searching FRED for '{}' (limit {})", query, limit);

        let hits = match self.source.api() {
            Ok(api) => api.search_series(&query, limit).await,
            Err(e) => Err(e),
        };

        match hits {
            Ok(hits) => ToolEnvelope::success(
                format!("Found {} FRED series matching '{}'.", hits.len(), query),
                Payload::Results(hits),
            ),
            Err(e) => {
                warn!("FRED search for '{}' failed: {}", query, e);
                ToolEnvelope::failure(
                    format!("Failed to search FRED series for '{}'.", query),
                    e.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fred::testing::StubFred;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn args(value: Value) -> ToolArgs {
        match value {
            Value::Object(map) => ToolArgs::new(map),
            _ => ToolArgs::default(),
        }
    }

    fn hits() -> Vec<Value> {
        (0..8)
            .map(|i| json!({"id": format!("SERIES{}", i), "title": "Some series"}))
            .collect()
    }

    #[tokio::test]
    async fn test_default_limit() {
        let stub = StubFred {
            search_hits: hits(),
            ..StubFred::default()
        };
        let envelope = FredSearchSeries::new(stub.source())
            .execute(args(json!({"query": "H.4.1"})))
            .await;

        let Some(Payload::Results(results)) = envelope.payload() else {
            panic!("expected results");
        };
        assert_eq!(results.len(), 5);
        assert_eq!(results[0]["id"], "SERIES0");
        assert_eq!(envelope.message(), "Found 5 FRED series matching 'H.4.1'.");
    }

    #[tokio::test]
    async fn test_explicit_limit() {
        let stub = StubFred {
            search_hits: hits(),
            ..StubFred::default()
        };
        let envelope = FredSearchSeries::new(stub.source())
            .execute(args(json!({"query": "cpi", "limit": 2})))
            .await;
        assert!(envelope.message().starts_with("Found 2 FRED series"));
    }

    #[tokio::test]
    async fn test_missing_query_skips_upstream() {
        let stub = Arc::new(StubFred::default());
        let source = FredSource::new(stub.clone());
        let envelope = FredSearchSeries::new(source)
            .execute(args(json!({"query": "  "})))
            .await;
        assert!(envelope.is_error());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }
}
