//! Recent observations tool.

use agent_core::{Payload, ToolEnvelope};
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::{FredSource, SNAPSHOT_LIMIT};
use crate::tool::{Tool, ToolArgs};
use crate::tools::object_schema;

/// Points returned when the engine does not ask for a specific count.
pub const DEFAULT_LATEST_POINTS: u64 = 12;

/// Fetches the most recent observations of a FRED series as a data block.
///
/// Missing values are dropped before the latest `latest_points` are taken,
/// and the points are returned oldest first.
pub struct FredRecentData {
    source: FredSource,
}

impl FredRecentData {
    pub fn new(source: FredSource) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for FredRecentData {
    fn name(&self) -> &str {
        "fred_recent_data"
    }

    fn description(&self) -> &str {
        "Fetch recent numeric datapoints for a FRED series and use them in analysis. \
         Call this when the user needs the latest figures or trends."
    }

    fn parameters(&self) -> Value {
        object_schema(
            json!({
                "series_id": {
                    "type": "string",
                    "description": "Exact FRED series identifier (e.g. UNRATE)."
                },
                "latest_points": {
                    "type": "integer",
                    "description": "Number of most recent datapoints to return (default 12).",
                    "minimum": 1
                }
            }),
            &["series_id"],
        )
    }

    fn missing_argument_message(&self, _parameter: &str) -> String {
        "A FRED series_id is required to fetch recent data.".to_string()
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let series_id = match args.get_string("series_id") {
            Ok(id) => id,
            Err(e) => {
                return ToolEnvelope::failure(self.missing_argument_message("series_id"), e.to_string())
            }
        };
        let latest_points = match args.get_u64_or("latest_points", DEFAULT_LATEST_POINTS) {
            Ok(n) => n as usize,
            Err(e) => {
                return ToolEnvelope::failure(
                    format!("Invalid latest_points for {}.", series_id),
                    e.to_string(),
                )
            }
        };

        debug!("Fetching {} recent points for {}", latest_points, series_id);

        let snapshot = match self.source.api() {
            Ok(api) => api.series_snapshot(&series_id, SNAPSHOT_LIMIT).await,
            Err(e) => Err(e),
        };

        match snapshot {
            Ok(snapshot) => {
                let block = snapshot.data_block(latest_points);
                ToolEnvelope::success(
                    format!(
                        "Retrieved {} recent data points for {} ({}).",
                        block.points.len(),
                        snapshot.title,
                        series_id
                    ),
                    Payload::SeriesData(vec![block]),
                )
            }
            Err(e) => {
                warn!("Recent data for {} failed: {}", series_id, e);
                ToolEnvelope::failure(
                    format!("Failed to fetch recent data for {}.", series_id),
                    e.to_string(),
                )
            }
        }
    }
}
