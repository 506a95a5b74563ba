//! Upstream API clients, each behind a narrow trait so adapters can be
//! exercised against in-memory doubles.

mod fraser;
pub(crate) mod fred;
mod opensearch;

pub use fraser::{FraserApi, FraserClient, FraserSource, FraserTitle};
pub use fred::{
    find_release_by_name, latest_year_schedule, ChartImage, FredApi, FredClient, FredRelease,
    FredSource, SeriesSnapshot, RELEASE_CATALOG_LIMIT, SNAPSHOT_LIMIT,
};
pub use opensearch::{DocumentIndex, IndexSource, OpenSearchIndex};
