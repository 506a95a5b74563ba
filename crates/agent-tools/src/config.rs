//! Environment configuration for the upstream clients and the executor.

use std::env;
use std::time::Duration;

use crate::executor::ToolPolicy;

pub const DEFAULT_FRED_API_URL: &str = "https://api.stlouisfed.org/fred";
pub const DEFAULT_FRED_GRAPH_URL: &str = "https://fred.stlouisfed.org/graph/fredgraph.png";
pub const DEFAULT_FRASER_API_URL: &str = "https://fraser.stlouisfed.org/api";
pub const DEFAULT_OPENSEARCH_INDEX: &str = "fred-series";

/// Connection settings for the OpenSearch knowledge index.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenSearchConfig {
    /// Base URL of the cluster, e.g. `https://localhost:9200`.
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Index holding the documents.
    pub index: String,
    /// Number of hits requested per query.
    pub top_k: usize,
}

impl OpenSearchConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
            index: DEFAULT_OPENSEARCH_INDEX.to_string(),
            top_k: 5,
        }
    }
}

/// Settings shared by every tool adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolsConfig {
    pub fred_api_key: Option<String>,
    pub fred_api_url: String,
    pub fred_graph_url: String,
    pub fraser_api_key: Option<String>,
    pub fraser_api_url: String,
    /// `None` when `OPENSEARCH_URL` is unset.
    pub opensearch: Option<OpenSearchConfig>,
    /// Client-level timeout for every outbound HTTP call.
    pub http_timeout: Duration,
    /// Executor-level bound on a single invocation.
    pub tool_timeout: Duration,
    /// Restricts the exposed tool table when set.
    pub allowlist: Option<Vec<String>>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            fred_api_key: None,
            fred_api_url: DEFAULT_FRED_API_URL.to_string(),
            fred_graph_url: DEFAULT_FRED_GRAPH_URL.to_string(),
            fraser_api_key: None,
            fraser_api_url: DEFAULT_FRASER_API_URL.to_string(),
            opensearch: None,
            http_timeout: Duration::from_secs(10),
            tool_timeout: Duration::from_secs(30),
            allowlist: None,
        }
    }
}

impl ToolsConfig {
    /// Create configuration from environment variables.
    ///
    /// Nothing here is required: a missing credential only disables the
    /// tools that need it.
    ///
    /// - `FRED_API_KEY`, `FRED_API_URL`, `FRED_GRAPH_URL`
    /// - `FRASER_API_KEY`, `FRASER_API_URL`
    /// - `OPENSEARCH_URL`, `OPENSEARCH_USERNAME`, `OPENSEARCH_PASSWORD`,
    ///   `OPENSEARCH_INDEX` (default: fred-series), `OPENSEARCH_TOP_K` (default: 5)
    /// - `HTTP_TIMEOUT_SECS` (default: 10), `TOOL_TIMEOUT_SECS` (default: 30)
    /// - `TOOL_ALLOWLIST` - comma-separated tool names
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let opensearch = non_empty_var("OPENSEARCH_URL").map(|url| OpenSearchConfig {
            url,
            username: non_empty_var("OPENSEARCH_USERNAME"),
            password: non_empty_var("OPENSEARCH_PASSWORD"),
            index: non_empty_var("OPENSEARCH_INDEX")
                .unwrap_or_else(|| DEFAULT_OPENSEARCH_INDEX.to_string()),
            top_k: env::var("OPENSEARCH_TOP_K")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|k| *k > 0)
                .unwrap_or(5),
        });

        let http_timeout = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        let tool_timeout = env::var("TOOL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.tool_timeout);

        let allowlist = non_empty_var("TOOL_ALLOWLIST").map(|list| {
            list.split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect()
        });

        Self {
            fred_api_key: non_empty_var("FRED_API_KEY"),
            fred_api_url: non_empty_var("FRED_API_URL").unwrap_or(defaults.fred_api_url),
            fred_graph_url: non_empty_var("FRED_GRAPH_URL").unwrap_or(defaults.fred_graph_url),
            fraser_api_key: non_empty_var("FRASER_API_KEY"),
            fraser_api_url: non_empty_var("FRASER_API_URL").unwrap_or(defaults.fraser_api_url),
            opensearch,
            http_timeout,
            tool_timeout,
            allowlist,
        }
    }

    /// The executor policy described by this configuration.
    pub fn policy(&self) -> ToolPolicy {
        let policy = ToolPolicy::default().with_timeout(self.tool_timeout);
        match self.allowlist {
            Some(ref names) => policy.allow_tools(names.iter().cloned()),
            None => policy,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
