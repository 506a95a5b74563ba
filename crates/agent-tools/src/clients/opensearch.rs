//! Knowledge-index retrieval over the OpenSearch REST API.

use std::sync::Arc;

use agent_core::Document;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::config::{OpenSearchConfig, ToolsConfig};
use crate::error::ToolError;

const MISSING_URL: &str = "OPENSEARCH_URL is required to retrieve documents but is not set.";

/// A ranked document store.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// The best `top_k` documents for a free-text query.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Document>, ToolError>;
}

/// Handle shared by the retrieval tool; unconfigured when no index is set.
#[derive(Clone)]
pub struct IndexSource {
    index: Option<Arc<dyn DocumentIndex>>,
    top_k: usize,
}

impl IndexSource {
    pub fn new(index: Arc<dyn DocumentIndex>, top_k: usize) -> Self {
        Self {
            index: Some(index),
            top_k: top_k.max(1),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            index: None,
            top_k: 5,
        }
    }

    pub fn from_config(config: &ToolsConfig, http: reqwest::Client) -> Self {
        match config.opensearch {
            Some(ref search) => Self::new(
                Arc::new(OpenSearchIndex::new(http, search.clone())),
                search.top_k,
            ),
            None => Self::unconfigured(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.index.is_some()
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub(crate) fn index(&self) -> Result<&dyn DocumentIndex, ToolError> {
        self.index
            .as_deref()
            .ok_or_else(|| ToolError::Configuration(MISSING_URL.to_string()))
    }
}

/// The `_search` body: a full-text `match` on the `content` field.
fn search_body(query: &str, top_k: usize) -> Value {
    json!({
        "size": top_k,
        "query": {
            "match": {"content": query}
        }
    })
}

/// Convert `hits.hits` into documents; `_source.content` becomes the text
/// and the remaining source fields plus the score become metadata.
fn parse_hits(body: &Value) -> Vec<Document> {
    let Some(hits) = body.pointer("/hits/hits").and_then(|h| h.as_array()) else {
        return Vec::new();
    };

    hits.iter()
        .map(|hit| {
            let mut metadata = match hit.get("_source") {
                Some(Value::Object(source)) => source.clone(),
                _ => Map::new(),
            };
            let content = match metadata.remove("content") {
                Some(Value::String(text)) => text,
                Some(other) => other.to_string(),
                None => String::new(),
            };
            if let Some(score) = hit.get("_score").filter(|s| !s.is_null()) {
                metadata.insert("score".to_string(), score.clone());
            }

            Document {
                id: hit.get("_id").and_then(|id| id.as_str()).map(str::to_string),
                content,
                metadata,
            }
        })
        .collect()
}

/// reqwest-backed [`DocumentIndex`].
pub struct OpenSearchIndex {
    http: reqwest::Client,
    config: OpenSearchConfig,
}

impl OpenSearchIndex {
    pub fn new(http: reqwest::Client, config: OpenSearchConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl DocumentIndex for OpenSearchIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<Document>, ToolError> {
        let url = format!(
            "{}/{}/_search",
            self.config.url.trim_end_matches('/'),
            self.config.index
        );
        debug!("OpenSearch query on '{}': '{}'", self.config.index, query);

        let mut request = self.http.post(&url).json(&search_body(query, top_k));
        if let Some(ref username) = self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let body: Value = request.send().await?.error_for_status()?.json().await?;
        Ok(parse_hits(&body))
    }
}
