//! Release calendar lookup for a series.

use agent_core::{Payload, ReleaseDate, ToolEnvelope};
use async_trait::async_trait;
use chrono::Datelike;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::clients::{latest_year_schedule, FredRelease, FredSource};
use crate::error::ToolError;
use crate::tool::{Tool, ToolArgs};
use crate::tools::object_schema;

/// Resolves a series to its (first) release and returns that release's
/// publication dates for the latest year on the calendar.
pub struct FredSeriesReleaseSchedule {
    source: FredSource,
}

impl FredSeriesReleaseSchedule {
    pub fn new(source: FredSource) -> Self {
        Self { source }
    }

    async fn fetch(&self, series_id: &str) -> Result<Option<(FredRelease, Vec<ReleaseDate>)>, ToolError> {
        let api = self.source.api()?;

        let Some(release) = api.series_releases(series_id).await?.into_iter().next() else {
            return Ok(None);
        };
        let dates = api.release_dates(release.id).await?;
        Ok(Some((release, latest_year_schedule(dates))))
    }
}

#[async_trait]
impl Tool for FredSeriesReleaseSchedule {
    fn name(&self) -> &str {
        "fred_series_release_schedule"
    }

    fn description(&self) -> &str {
        "Resolve a FRED series to its release and return upcoming release dates."
    }

    fn parameters(&self) -> Value {
        object_schema(
            json!({
                "series_id": {
                    "type": "string",
                    "description": "FRED series identifier (e.g. UNRATE, CPIAUCSL)."
                }
            }),
            &["series_id"],
        )
    }

    fn missing_argument_message(&self, _parameter: &str) -> String {
        "A FRED series_id is required to fetch the series release schedule.".to_string()
    }

    async fn execute(&self, args: ToolArgs) -> ToolEnvelope {
        let series_id = match args.get_string("series_id") {
            Ok(id) => id,
            Err(e) => {
                return ToolEnvelope::failure(self.missing_argument_message("series_id"), e.to_string())
            }
        };

        debug!("Resolving release schedule for {}", series_id);

        match self.fetch(&series_id).await {
            Ok(Some((release, schedule))) => {
                let message = match schedule.first() {
                    Some(first) => format!(
                        "Retrieved {} release dates for {} (release_id={}) in {}.",
                        schedule.len(),
                        release.name,
                        release.id,
                        first.date.year()
                    ),
                    None => format!(
                        "No release dates returned for {} (release_id={}).",
                        release.name, release.id
                    ),
                };
                ToolEnvelope::success(message, Payload::ReleaseSchedule(schedule))
            }
            Ok(None) => ToolEnvelope::failure(
                format!("No release found for series {}.", series_id),
                "no_release",
            ),
            Err(e) => {
                warn!("Release schedule for {} failed: {}", series_id, e);
                ToolEnvelope::failure(
                    format!("Failed to fetch the release schedule for {}.", series_id),
                    e.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fred::testing::{release, StubFred};
    use chrono::NaiveDate;

    fn args(series_id: &str) -> ToolArgs {
        let mut params = serde_json::Map::new();
        params.insert("series_id".to_string(), Value::String(series_id.to_string()));
        ToolArgs::new(params)
    }

    fn release_date(y: i32, m: u32, d: u32) -> ReleaseDate {
        ReleaseDate {
            release_id: Some(50),
            release_name: Some("Gross Domestic Product".to_string()),
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_keeps_latest_year_only() {
        let stub = StubFred {
            series_releases: vec![release(50, "Gross Domestic Product"), release(51, "Other")],
            release_dates: vec![
                release_date(2024, 10, 30),
                release_date(2025, 1, 30),
                release_date(2025, 2, 27),
                release_date(2025, 3, 27),
            ],
            ..StubFred::default()
        };
        let envelope = FredSeriesReleaseSchedule::new(stub.source())
            .execute(args("GDP"))
            .await;

        assert!(!envelope.is_error());
        let Some(Payload::ReleaseSchedule(schedule)) = envelope.payload() else {
            panic!("expected release schedule");
        };
        assert_eq!(schedule.len(), 3);
        assert!(schedule.iter().all(|d| d.date.year() == 2025));
        assert_eq!(
            envelope.message(),
            "Retrieved 3 release dates for Gross Domestic Product (release_id=50) in 2025."
        );
    }

    #[tokio::test]
    async fn test_no_release_is_error() {
        let envelope = FredSeriesReleaseSchedule::new(StubFred::default().source())
            .execute(args("NOPE"))
            .await;
        assert!(envelope.is_error());
        assert!(envelope.payload().is_none());
        assert_eq!(envelope.message(), "No release found for series NOPE.");
    }

    #[tokio::test]
    async fn test_empty_calendar() {
        let stub = StubFred {
            series_releases: vec![release(50, "Gross Domestic Product")],
            ..StubFred::default()
        };
        let envelope = FredSeriesReleaseSchedule::new(stub.source())
            .execute(args("GDP"))
            .await;
        assert!(!envelope.is_error());
        assert!(envelope.message().starts_with("No release dates returned"));
    }
}
