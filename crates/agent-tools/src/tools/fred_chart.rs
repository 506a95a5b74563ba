//! Chart tool backed by the FRED graph endpoint.

use agent_core::{Attachment, Payload, ToolEnvelope};
use async_trait::async_trait;
use base64::Engine;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::{FredSource, SNAPSHOT_LIMIT};
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs};
use crate::tools::object_schema;

/// Renders a chart for a FRED series and shares it as an image attachment.
///
/// # Parameters
///
/// - `series_id` (required): Exact FRED series identifier (e.g. CPIAUCSL).
///
/// The PNG is downloaded from the graph endpoint and embedded as a
/// `data:image/png;base64,...` URI. The tool-result text fed back to the
/// engine never contains the image itself.
pub struct FredChart {
    source: FredSource,
}

impl FredChart {
    pub fn new(source: FredSource) -> Self {
        Self { source }
    }

    async fn build_attachment(&self, series_id: &str) -> Result<Attachment, ToolError> {
        let api = self.source.api()?;

        let snapshot = api.series_snapshot(series_id, SNAPSHOT_LIMIT).await?;
        if snapshot.observations().is_empty() {
            return Err(ToolError::Upstream(format!(
                "No datapoints available to chart {}",
                series_id
            )));
        }

        let image = api.chart_image(series_id).await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);

        Ok(Attachment::image(
            format!("data:image/png;base64,{}", encoded),
            snapshot.title,
            series_id,
        )
        .with_units(snapshot.units)
        .with_chart_url(image.url))
    }
}

#[async_trait]
impl Tool for FredChart {
    fn name(&self) -> &str {
        "fred_chart"
    }

    fn description(&self) -> &str {
        "Render a chart for a FRED series and share the image with the user. \
         Call this when the user asks for a plot or visualization."
    }

    fn parameters(&self) -> Value {
        object_schema(
            json!({
                "series_id": {
                    "type": "string",
                    "description": "Exact FRED series identifier (e.g. CPIAUCSL)."
                }
            }),
            &["series_id"],
        )
    }

    fn missing_argument_message(&self, _parameter: &str) -> String {
        "A FRED series_id is required for chart generation.".to_string()
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let series_id = match args.get_string("series_id") {
            Ok(id) => id,
            Err(e) => {
                return ToolEnvelope::failure(self.missing_argument_message("series_id"), e.to_string())
            }
        };

        debug!("Charting FRED series {}", series_id);

        match self.build_attachment(&series_id).await {
            Ok(attachment) => ToolEnvelope::success(
                format!("Generated chart for {} ({}).", attachment.title, series_id),
                Payload::Attachments(vec![attachment]),
            ),
            Err(e) => {
                warn!("Chart for {} failed: {}", series_id, e);
                ToolEnvelope::failure(
                    format!("Failed to generate chart for {}.", series_id),
                    e.to_string(),
                )
            }
        }
    }
}
