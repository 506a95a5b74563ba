//! Release metadata and table structure by release name.

use agent_core::{Payload, ToolEnvelope};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::{find_release_by_name, FredSource, RELEASE_CATALOG_LIMIT};
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs};
use crate::tools::object_schema;

pub struct FredReleaseStructure {
    source: FredSource,
}

impl FredReleaseStructure {
    pub fn new(source: FredSource) -> Self {
        Self { source }
    }

    /// `None` when no release name matches.
    async fn fetch(&self, release_name: &str) -> Result<Option<(String, Value)>, ToolError> {
        let api = self.source.api()?;

        let catalog = api.releases(RELEASE_CATALOG_LIMIT).await?;
        let Some(release) = find_release_by_name(&catalog, release_name) else {
            return Ok(None);
        };

        // Only the count is needed from the series listing.
        let series = api.release_series(release.id, 1).await?;
        let tables = api.release_tables(release.id).await?;

        let structure = json!({
            "release": release,
            "series_count": series.get("count").cloned().unwrap_or(Value::Null),
            "series_sample": series.get("seriess").cloned().unwrap_or_else(|| json!([])),
            "tables": tables,
        });
        Ok(Some((format!("{} (release_id={})", release.name, release.id), structure)))
    }
}

#[async_trait]
impl Tool for FredReleaseStructure {
    fn name(&self) -> &str {
        "fred_release_structure"
    }

    fn description(&self) -> &str {
        "Fetch release metadata and table structure by release name (e.g. H.4.1)."
    }

    fn parameters(&self) -> Value {
        object_schema(
            json!({
                "release_name": {
                    "type": "string",
                    "description": "FRED release name to inspect (e.g. H.4.1)."
                }
            }),
            &["release_name"],
        )
    }

    fn missing_argument_message(&self, _parameter: &str) -> String {
        "A release_name is required to fetch release structure metadata.".to_string()
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let release_name = match args.get_string("release_name") {
            Ok(name) => name,
            Err(e) => {
                return ToolEnvelope::failure(
                    self.missing_argument_message("release_name"),
                    e.to_string(),
                )
            }
        };

        debug!("Looking up release structure for '{}'", release_name);

        match self.fetch(&release_name).await {
            Ok(Some((label, structure))) => ToolEnvelope::success(
                format!("Retrieved release structure for {}.", label),
                Payload::ReleaseStructure(structure),
            ),
            Ok(None) => ToolEnvelope::success(
                format!("No FRED release matched '{}'.", release_name),
                Payload::Results(Vec::new()),
            ),
            Err(e) => {
                warn!("Release structure for '{}' failed: {}", release_name, e);
                ToolEnvelope::failure(
                    format!("Failed to fetch release structure for '{}'.", release_name),
                    e.to_string(),
                )
            }
        }
    }
}
