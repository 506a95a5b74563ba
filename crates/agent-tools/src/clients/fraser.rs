//! FRASER archive title search.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::ToolsConfig;
use crate::error::ToolError;

const MISSING_KEY: &str = "FRASER_API_KEY is required to call FRASER tools but is not set.";

/// A normalized title record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraserTitle {
    pub id: Option<String>,
    pub title: Option<String>,
    pub pdf_urls: Vec<String>,
}

/// The FRASER search capability used by the title tool.
#[async_trait]
pub trait FraserApi: Send + Sync {
    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<FraserTitle>, ToolError>;
}

/// Handle shared by the FRASER tool; unconfigured when no key is set.
#[derive(Clone, Default)]
pub struct FraserSource {
    api: Option<Arc<dyn FraserApi>>,
}

impl FraserSource {
    pub fn new(api: Arc<dyn FraserApi>) -> Self {
        Self { api: Some(api) }
    }

    pub fn unconfigured() -> Self {
        Self { api: None }
    }

    pub fn from_config(config: &ToolsConfig, http: reqwest::Client) -> Self {
        match config.fraser_api_key {
            Some(ref key) => Self::new(Arc::new(FraserClient::new(
                http,
                key.clone(),
                config.fraser_api_url.clone(),
            ))),
            None => Self::unconfigured(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api.is_some()
    }

    pub(crate) fn api(&self) -> Result<&dyn FraserApi, ToolError> {
        self.api
            .as_deref()
            .ok_or_else(|| ToolError::Configuration(MISSING_KEY.to_string()))
    }
}

/// A string, or the first string of an array.
fn first_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => first_string(items.first()),
        _ => None,
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Normalize one record of the `api/title` response.
fn parse_record(record: &Value) -> FraserTitle {
    let title = record
        .get("titleInfo")
        .and_then(|info| match info {
            Value::Array(items) => items.first(),
            other => Some(other),
        })
        .and_then(|info| info.get("title"))
        .and_then(|t| first_string(Some(t)));

    let id = record
        .get("recordInfo")
        .and_then(|info| first_string(info.get("recordIdentifier")));

    let pdf_urls = record
        .get("location")
        .map(|location| string_list(location.get("pdfUrl")))
        .unwrap_or_default();

    FraserTitle { id, title, pdf_urls }
}

/// reqwest-backed [`FraserApi`].
pub struct FraserClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl FraserClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            api_url: api_url.into(),
        }
    }
}

#[async_trait]
impl FraserApi for FraserClient {
    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<FraserTitle>, ToolError> {
        let url = format!("{}/title", self.api_url.trim_end_matches('/'));
        debug!("FRASER title search: '{}' (limit {})", query, limit);

        let body: Value = self
            .http
            .get(&url)
            .header("X-API-Key", &self.api_key)
            .query(&[
                ("format", "json"),
                ("fields", "titleInfo,recordInfo,location"),
                ("page", "1"),
                ("search", query),
            ])
            .query(&[("limit", limit)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .get("records")
            .and_then(|r| r.as_array())
            .map(|records| records.iter().map(parse_record).collect())
            .unwrap_or_default())
    }
}
