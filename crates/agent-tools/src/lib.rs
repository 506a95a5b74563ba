//! Tool registry and adapters for the economic-data agent.
//!
//! This crate provides a `ToolRegistry` holding the tools the reasoning
//! engine may call, a [`RegistryToolExecutor`] that enforces an allowlist and
//! a per-invocation timeout, and the adapters themselves. Every adapter turns
//! its arguments into a [`agent_core::ToolEnvelope`] and never fails outward.
//!
//! # Built-in Tools
//!
//! ## Knowledge base
//! - [`RetrieveDocuments`] - Ranked documents from the OpenSearch index.
//!
//! ## FRED (Federal Reserve Economic Data)
//! - [`FredChart`] - Chart image for a series.
//! - [`FredRecentData`] - Latest observations as a data block.
//! - [`FredSeriesReleaseSchedule`] - Release calendar for a series.
//! - [`FredReleaseStructure`] - Release metadata and tables by name.
//! - [`FredSearchSeries`] - Catalog search.
//!
//! ## FRASER
//! - [`FraserSearchTitles`] - FOMC meeting title search.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_tools::{executor_from_config, ToolsConfig};
//! use serde_json::{json, Value};
//!
//! #[tokio::main]
//! async fn main() {
//!     let executor = executor_from_config(&ToolsConfig::from_env()).unwrap();
//!
//!     let Value::Object(args) = json!({"series_id": "UNRATE", "latest_points": 6}) else {
//!         unreachable!()
//!     };
//!     let envelope = executor.execute("fred_recent_data", args).await.unwrap();
//!     println!("{}", envelope.tool_content());
//! }
//! ```

pub mod clients;
mod config;
mod error;
mod executor;
mod registry;
mod tool;
pub mod tools;

pub use clients::{
    DocumentIndex, FraserApi, FraserSource, FredApi, FredSource, IndexSource, SeriesSnapshot,
};
pub use config::{OpenSearchConfig, ToolsConfig};
pub use error::ToolError;
pub use executor::{RegistryToolExecutor, ToolPolicy};
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolArgs};
pub use tools::{
    FraserSearchTitles, FredChart, FredRecentData, FredReleaseStructure, FredSearchSeries,
    FredSeriesReleaseSchedule, RetrieveDocuments,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

use tracing::warn;

/// Create a registry with every built-in tool, in the order presented to
/// the reasoning engine.
pub fn default_registry(fred: FredSource, fraser: FraserSource, index: IndexSource) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(RetrieveDocuments::new(index));

    registry.register(FredChart::new(fred.clone()));
    registry.register(FredRecentData::new(fred.clone()));
    registry.register(FredSeriesReleaseSchedule::new(fred.clone()));
    registry.register(FredReleaseStructure::new(fred.clone()));

    registry.register(FraserSearchTitles::new(fraser));

    registry.register(FredSearchSeries::new(fred));

    registry
}

/// Build the live registry from configuration.
///
/// Missing credentials are reported here, once; the affected tools then
/// answer with error envelopes.
pub fn registry_from_config(config: &ToolsConfig) -> Result<ToolRegistry, ToolError> {
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let fred = FredSource::from_config(config, http.clone());
    if !fred.is_configured() {
        warn!("FRED_API_KEY is not set; FRED tools will report a configuration error");
    }

    let fraser = FraserSource::from_config(config, http.clone());
    if !fraser.is_configured() {
        warn!("FRASER_API_KEY is not set; FRASER title search is disabled");
    }

    let index = IndexSource::from_config(config, http);
    if !index.is_configured() {
        warn!("OPENSEARCH_URL is not set; document retrieval is disabled");
    }

    Ok(default_registry(fred, fraser, index))
}

/// Build the live registry wrapped in an executor carrying the configured policy.
pub fn executor_from_config(config: &ToolsConfig) -> Result<RegistryToolExecutor, ToolError> {
    let registry = registry_from_config(config)?;
    Ok(RegistryToolExecutor::with_policy(registry, config.policy()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry(
            FredSource::unconfigured(),
            FraserSource::unconfigured(),
            IndexSource::unconfigured(),
        );
        assert_eq!(
            registry.list_tools(),
            vec![
                "retrieve_documents",
                "fred_chart",
                "fred_recent_data",
                "fred_series_release_schedule",
                "fred_release_structure",
                "fraser_search_fomc_titles",
                "fred_search_series",
            ]
        );
    }

    #[test]
    fn test_definitions_are_well_formed() {
        let registry = default_registry(
            FredSource::unconfigured(),
            FraserSource::unconfigured(),
            IndexSource::unconfigured(),
        );
        for definition in registry.definitions() {
            let value = serde_json::to_value(&definition).unwrap();
            assert_eq!(value["type"], "function");
            assert_eq!(value["function"]["parameters"]["type"], "object");
            assert!(!definition.function.description.is_empty());

            let required = definition.required_parameters();
            assert_eq!(required.len(), 1, "{}", definition.name());
            assert!(value["function"]["parameters"]["properties"]
                .get(required[0])
                .is_some());
        }
    }

    #[tokio::test]
    async fn test_unconfigured_tools_answer_with_errors() {
        let executor = executor_from_config(&ToolsConfig::default()).unwrap();
        let mut args = serde_json::Map::new();
        args.insert("series_id".to_string(), serde_json::Value::from("UNRATE"));

        let envelope = executor.execute("fred_recent_data", args).await.unwrap();
        assert!(envelope.is_error());
        assert!(envelope.error().unwrap().contains("FRED_API_KEY"));
    }
}
