//! Knowledge-base retrieval tool.

use agent_core::{Payload, ToolEnvelope};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::IndexSource;
use crate::tool::{Tool, ToolArgs};
use crate::tools::object_schema;

/// Searches the indexed knowledge base.
///
/// The full hit list travels in the payload; the tool-result text shows at
/// most three documents.
pub struct RetrieveDocuments {
    source: IndexSource,
}

impl RetrieveDocuments {
    pub fn new(source: IndexSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for RetrieveDocuments {
    fn name(&self) -> &str {
        "retrieve_documents"
    }

    fn description(&self) -> &str {
        "Use this tool to search the indexed knowledge base for information \
         relevant to the user's question. Provide a concise natural language query."
    }

    fn parameters(&self) -> Value {
        object_schema(
            json!({
                "query": {
                    "type": "string",
                    "description": "Search query to retrieve supporting documents."
                }
            }),
            &["query"],
        )
    }

    fn missing_argument_message(&self, _parameter: &str) -> String {
        "No query provided to retrieval tool.".to_string()
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let query = match args.get_string("query") {
            Ok(q) => q,
            Err(e) => {
                return ToolEnvelope::failure(self.missing_argument_message("query"), e.to_string())
            }
        };

        debug!("Retrieving documents for '{}'", query);

        let docs = match self.source.index() {
            Ok(index) => index.search(&query, self.source.top_k()).await,
            Err(e) => Err(e),
        };

        match docs {
            Ok(docs) => ToolEnvelope::success(
                format!("Retrieved {} documents for '{}'.", docs.len(), query),
                Payload::Documents(docs),
            ),
            Err(e) => {
                warn!("Retrieval for '{}' failed: {}", query, e);
                ToolEnvelope::failure(
                    format!("Failed to retrieve documents for '{}'.", query),
                    e.to_string(),
                )
            }
        }
    }
}
