//! The tool adapters exposed to the reasoning engine.

mod fraser_titles;
mod fred_chart;
mod fred_recent_data;
mod fred_release_schedule;
mod fred_release_structure;
mod fred_search;
mod retrieve_documents;

pub use fraser_titles::FraserSearchTitles;
pub use fred_chart::FredChart;
pub use fred_recent_data::FredRecentData;
pub use fred_release_schedule::FredSeriesReleaseSchedule;
pub use fred_release_structure::FredReleaseStructure;
pub use fred_search::FredSearchSeries;
pub use retrieve_documents::RetrieveDocuments;

use serde_json::{json, Value};

/// Parameters object schema with the given properties and required names.
pub(crate) fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}
