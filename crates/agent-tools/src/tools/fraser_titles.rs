//! FOMC title search against the FRASER archive.

use agent_core::{Payload, ToolEnvelope};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::FraserSource;
use crate::tool::{Tool, ToolArgs};
use crate::tools::object_schema;

pub const DEFAULT_TITLE_LIMIT: u64 = 5;

pub struct FraserSearchTitles {
    source: FraserSource,
}

impl FraserSearchTitles {
    pub fn new(source: FraserSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for FraserSearchTitles {
    fn name(&self) -> &str {
        "fraser_search_fomc_titles"
    }

    fn description(&self) -> &str {
        "Search the FRASER/Postgres FOMC catalog for meeting titles (e.g. 'Meeting, January 2010')."
    }

    fn parameters(&self) -> Value {
        object_schema(
            json!({
                "query": {
                    "type": "string",
                    "description": "Fuzzy title query, e.g. 'Meeting, January 26-27, 2010'."
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of titles to return (default 5).",
                    "minimum": 1
                }
            }),
            &["query"],
        )
    }

    fn missing_argument_message(&self, _parameter: &str) -> String {
        "A query is required to search FOMC titles.".to_string()
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let query = match args.get_string("query") {
            Ok(q) => q,
            Err(e) => {
                return ToolEnvelope::failure(self.missing_argument_message("query"), e.to_string())
            }
        };
        let limit = match args.get_u64_or("limit", DEFAULT_TITLE_LIMIT) {
            Ok(n) => n as usize,
            Err(e) => {
                return ToolEnvelope::failure(
                    format!("Invalid limit for FOMC title search '{}'.", query),
                    e.to_string(),
                )
            }
        };

        debug!("Searching FRASER titles for '{}'", query);

        let titles = match self.source.api() {
            Ok(api) => api.search_titles(&query, limit).await,
            Err(e) => Err(e),
        };

        match titles.and_then(|titles| {
            titles
                .into_iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<_>, _>>()
                .map_err(Into::into)
        }) {
            Ok(results) => ToolEnvelope::success(
                format!("Found {} titles similar to '{}'.", results.len(), query),
                Payload::Results(results),
            ),
            Err(e) => {
                warn!("FRASER title search for '{}' failed: {}", query, e);
                ToolEnvelope::failure(
                    format!("Failed to search FOMC titles for '{}'.", query),
                    e.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{FraserApi, FraserTitle};
    use crate::error::ToolError;
    use std::sync::Arc;

    struct StubFraser(Vec<FraserTitle>);

    #[async_trait]
    impl FraserApi for StubFraser {
        async fn search_titles(&self, _query: &str, limit: usize) -> Result<Vec<FraserTitle>, ToolError> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    fn title(id: &str, name: &str) -> FraserTitle {
        FraserTitle {
            id: Some(id.to_string()),
            title: Some(name.to_string()),
            pdf_urls: vec![format!("https://fraser.stlouisfed.org/files/{}.pdf", id)],
        }
    }

    fn args(query: &str) -> ToolArgs {
        let mut params = serde_json::Map::new();
        params.insert("query".to_string(), Value::String(query.to_string()));
        ToolArgs::new(params)
    }

    #[tokio::test]
    async fn test_normalized_results() {
        let source = FraserSource::new(Arc::new(StubFraser(vec![
            title("677", "Meeting, January 26-27, 2010"),
            title("678", "Meeting, March 16, 2010"),
        ])));
        let envelope = FraserSearchTitles::new(source)
            .execute(args("January 2010"))
            .await;

        assert_eq!(envelope.message(), "Found 2 titles similar to 'January 2010'.");
        let Some(Payload::Results(results)) = envelope.payload() else {
            panic!("expected results");
        };
        assert_eq!(results[0]["id"], "677");
        assert_eq!(results[0]["title"], "Meeting, January 26-27, 2010");
        assert!(results[0]["pdf_urls"].is_array());
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let envelope = FraserSearchTitles::new(FraserSource::unconfigured())
            .execute(args("January 2010"))
            .await;
        assert!(envelope.is_error());
        assert_eq!(
            envelope.message(),
            "Failed to search FOMC titles for 'January 2010'."
        );
        assert!(envelope.error().unwrap().contains("FRASER_API_KEY"));
    }
}
