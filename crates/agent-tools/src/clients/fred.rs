//! FRED REST client and the series/release types the tools work with.

use std::sync::Arc;

use agent_core::{DataBlock, DataPoint, ReleaseDate};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ToolsConfig;
use crate::error::ToolError;

/// Number of observations fetched for a snapshot (newest first).
pub const SNAPSHOT_LIMIT: usize = 180;

/// Number of releases scanned when matching a release by name.
pub const RELEASE_CATALOG_LIMIT: usize = 1000;

const MISSING_KEY: &str = "FRED_API_KEY is required to call FRED tools but is not set.";

/// Series metadata plus its recent observations, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub series_id: String,
    pub title: String,
    pub units: String,
    pub frequency: String,
    observations: Vec<DataPoint>,
}

impl SeriesSnapshot {
    /// Build a snapshot from observations in chronological order.
    ///
    /// NaN values are dropped.
    pub fn new(
        series_id: impl Into<String>,
        title: impl Into<String>,
        units: impl Into<String>,
        frequency: impl Into<String>,
        observations: Vec<DataPoint>,
    ) -> Self {
        Self {
            series_id: series_id.into(),
            title: title.into(),
            units: units.into(),
            frequency: frequency.into(),
            observations: observations
                .into_iter()
                .filter(|p| !p.value.is_nan())
                .collect(),
        }
    }

    /// Build a snapshot from rows in reverse chronological order, as the
    /// observations endpoint returns them with `sort_order=desc`.
    pub fn from_descending<I>(
        series_id: impl Into<String>,
        title: impl Into<String>,
        units: impl Into<String>,
        frequency: impl Into<String>,
        rows: I,
    ) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut observations: Vec<DataPoint> = rows
            .into_iter()
            .map(|(date, value)| DataPoint { date, value })
            .collect();
        observations.reverse();
        Self::new(series_id, title, units, frequency, observations)
    }

    /// All observations, oldest first.
    pub fn observations(&self) -> &[DataPoint] {
        &self.observations
    }

    /// The most recent `count` observations, oldest first.
    pub fn latest(&self, count: usize) -> &[DataPoint] {
        let start = self.observations.len().saturating_sub(count);
        &self.observations[start..]
    }

    /// A data block holding the most recent `latest_points` observations.
    pub fn data_block(&self, latest_points: usize) -> DataBlock {
        DataBlock {
            series_id: self.series_id.clone(),
            title: self.title.clone(),
            units: self.units.clone(),
            frequency: self.frequency.clone(),
            points: self.latest(latest_points).to_vec(),
        }
    }
}

/// A release entry from the FRED catalog.
///
/// Fields other than `id` and `name` are kept as-is for pass-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FredRelease {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A rendered chart downloaded from the graph endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartImage {
    /// URL the image was fetched from.
    pub url: String,
    /// PNG bytes.
    pub bytes: Vec<u8>,
}

/// Keep only the dates falling in the latest year present.
pub fn latest_year_schedule(dates: Vec<ReleaseDate>) -> Vec<ReleaseDate> {
    let Some(latest_year) = dates.iter().map(|d| d.date.year()).max() else {
        return Vec::new();
    };
    dates
        .into_iter()
        .filter(|d| d.date.year() == latest_year)
        .collect()
}

/// First release whose name contains `query`, ignoring case.
pub fn find_release_by_name<'a>(releases: &'a [FredRelease], query: &str) -> Option<&'a FredRelease> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    releases
        .iter()
        .find(|release| release.name.to_lowercase().contains(&needle))
}

/// The slice of the FRED API the tools depend on.
#[async_trait]
pub trait FredApi: Send + Sync {
    /// Metadata plus the latest `limit` observations.
    async fn series_snapshot(&self, series_id: &str, limit: usize) -> Result<SeriesSnapshot, ToolError>;

    /// Download the rendered chart image for a series.
    async fn chart_image(&self, series_id: &str) -> Result<ChartImage, ToolError>;

    /// Releases a series belongs to.
    async fn series_releases(&self, series_id: &str) -> Result<Vec<FredRelease>, ToolError>;

    /// Publication calendar of a release, including dates with no data.
    async fn release_dates(&self, release_id: u64) -> Result<Vec<ReleaseDate>, ToolError>;

    /// The release catalog.
    async fn releases(&self, limit: usize) -> Result<Vec<FredRelease>, ToolError>;

    /// Series listing of a release (the raw response, including `count`).
    async fn release_series(&self, release_id: u64, limit: usize) -> Result<Value, ToolError>;

    /// Table structure of a release (the raw response).
    async fn release_tables(&self, release_id: u64) -> Result<Value, ToolError>;

    /// Full-text series search.
    async fn search_series(&self, query: &str, limit: usize) -> Result<Vec<Value>, ToolError>;
}

/// Handle shared by the FRED tools.
///
/// An unconfigured source makes every FRED tool answer with a configuration
/// error envelope while leaving the other tools untouched.
#[derive(Clone, Default)]
pub struct FredSource {
    api: Option<Arc<dyn FredApi>>,
}

impl FredSource {
    pub fn new(api: Arc<dyn FredApi>) -> Self {
        Self { api: Some(api) }
    }

    pub fn unconfigured() -> Self {
        Self { api: None }
    }

    /// Build the live client when `FRED_API_KEY` is configured.
    pub fn from_config(config: &ToolsConfig, http: reqwest::Client) -> Self {
        match config.fred_api_key {
            Some(ref key) => Self::new(Arc::new(FredClient::new(
                http,
                key.clone(),
                config.fred_api_url.clone(),
                config.fred_graph_url.clone(),
            ))),
            None => Self::unconfigured(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api.is_some()
    }

    pub(crate) fn api(&self) -> Result<&dyn FredApi, ToolError> {
        self.api
            .as_deref()
            .ok_or_else(|| ToolError::Configuration(MISSING_KEY.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct SeriesInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    units: String,
    #[serde(default)]
    frequency: String,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct RawReleaseDate {
    #[serde(default)]
    release_id: Option<u64>,
    #[serde(default)]
    release_name: Option<String>,
    date: String,
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Observation rows with missing (`.`) or unparsable values removed.
fn parse_observations(rows: Vec<RawObservation>) -> Vec<(NaiveDate, f64)> {
    rows.into_iter()
        .filter_map(|row| {
            let date = parse_date(&row.date)?;
            let value = row.value.trim().parse::<f64>().ok()?;
            Some((date, value))
        })
        .collect()
}

fn parse_release_dates(rows: Vec<RawReleaseDate>) -> Vec<ReleaseDate> {
    rows.into_iter()
        .filter_map(|row| {
            Some(ReleaseDate {
                release_id: row.release_id,
                release_name: row.release_name,
                date: parse_date(&row.date)?,
            })
        })
        .collect()
}

/// Pull an array field out of a response body and deserialize it.
fn take_array<T: serde::de::DeserializeOwned>(body: &mut Value, field: &str) -> Result<Vec<T>, ToolError> {
    match body.get_mut(field).map(Value::take) {
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(items) => Ok(serde_json::from_value(items)?),
    }
}

/// Extract FRED's `error_message` from an error body, if present.
fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error_message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

/// reqwest-backed [`FredApi`].
pub struct FredClient {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
    graph_url: String,
}

impl FredClient {
    pub fn new(
        http: reqwest::Client,
        api_key: impl Into<String>,
        api_url: impl Into<String>,
        graph_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            api_url: api_url.into(),
            graph_url: graph_url.into(),
        }
    }

    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ToolError> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), path);
        debug!("FRED request: {} {:?}", path, params);

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("file_type", "json")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Upstream(format!(
                "FRED {} returned {}: {}",
                path,
                status,
                upstream_error_message(&body)
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl FredApi for FredClient {
    async fn series_snapshot(&self, series_id: &str, limit: usize) -> Result<SeriesSnapshot, ToolError> {
        let mut info_body = self
            .get_json("series", &[("series_id", series_id.to_string())])
            .await?;
        let info: SeriesInfo = take_array(&mut info_body, "seriess")?
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::Upstream(format!("No FRED series found for {}", series_id)))?;

        let mut body = self
            .get_json(
                "series/observations",
                &[
                    ("series_id", series_id.to_string()),
                    ("limit", limit.to_string()),
                    ("sort_order", "desc".to_string()),
                ],
            )
            .await?;
        let rows = parse_observations(take_array(&mut body, "observations")?);

        let title = if info.title.is_empty() {
            series_id.to_string()
        } else {
            info.title
        };
        Ok(SeriesSnapshot::from_descending(
            series_id,
            title,
            info.units,
            info.frequency,
            rows,
        ))
    }

    async fn chart_image(&self, series_id: &str) -> Result<ChartImage, ToolError> {
        let request = self
            .http
            .get(&self.graph_url)
            .query(&[("id", series_id)])
            .build()?;
        let url = request.url().to_string();
        debug!("Downloading chart: {}", url);

        let response = self.http.execute(request).await?.error_for_status()?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ToolError::Upstream(format!("Empty chart image for {}", series_id)));
        }

        Ok(ChartImage {
            url,
            bytes: bytes.to_vec(),
        })
    }

    async fn series_releases(&self, series_id: &str) -> Result<Vec<FredRelease>, ToolError> {
        let mut body = self
            .get_json("series/release", &[("series_id", series_id.to_string())])
            .await?;
        take_array(&mut body, "releases")
    }

    async fn release_dates(&self, release_id: u64) -> Result<Vec<ReleaseDate>, ToolError> {
        let mut body = self
            .get_json(
                "release/dates",
                &[
                    ("release_id", release_id.to_string()),
                    ("include_release_dates_with_no_data", "true".to_string()),
                ],
            )
            .await?;
        Ok(parse_release_dates(take_array(&mut body, "release_dates")?))
    }

    async fn releases(&self, limit: usize) -> Result<Vec<FredRelease>, ToolError> {
        let mut body = self
            .get_json("releases", &[("limit", limit.to_string())])
            .await?;
        take_array(&mut body, "releases")
    }

    async fn release_series(&self, release_id: u64, limit: usize) -> Result<Value, ToolError> {
        self.get_json(
            "release/series",
            &[
                ("release_id", release_id.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn release_tables(&self, release_id: u64) -> Result<Value, ToolError> {
        self.get_json("release/tables", &[("release_id", release_id.to_string())])
            .await
    }

    async fn search_series(&self, query: &str, limit: usize) -> Result<Vec<Value>, ToolError> {
        let mut body = self
            .get_json(
                "series/search",
                &[
                    ("search_text", query.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        take_array(&mut body, "seriess")
    }
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_latest_keeps_chronological_order() {
        let snapshot = monthly_snapshot(8);
        let dates: Vec<String> = snapshot
            .latest(3)
            .iter()
            .map(|p| p.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-06-01", "2024-07-01", "2024-08-01"]);
        assert_eq!(snapshot.latest(50).len(), 8);
        assert!(snapshot.latest(0).is_empty());
    }

    #[test]
    fn test_nan_dropped_before_truncation() {
        // Newest first, as the observations endpoint returns them.
        let rows = vec![
            (date(2024, 4, 1), f64::NAN),
            (date(2024, 3, 1), 3.0),
            (date(2024, 2, 1), 2.0),
            (date(2024, 1, 1), 1.0),
        ];
        let snapshot = SeriesSnapshot::from_descending("X", "X", "", "", rows);
        let values: Vec<f64> = snapshot.latest(2).iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 3.0]);
        assert_eq!(snapshot.observations().len(), 3);
    }

    #[test]
    fn test_parse_observations_skips_missing() {
        let rows: Vec<RawObservation> = serde_json::from_value(json!([
            {"date": "2024-03-01", "value": "4.1"},
            {"date": "2024-02-01", "value": "."},
            {"date": "not-a-date", "value": "3.9"},
            {"date": "2024-01-01", "value": "3.7"}
        ]))
        .unwrap();
        let parsed = parse_observations(rows);
        assert_eq!(parsed, vec![(date(2024, 3, 1), 4.1), (date(2024, 1, 1), 3.7)]);
    }

    #[test]
    fn test_data_block() {
        let block = monthly_snapshot(8).data_block(3);
        assert_eq!(block.series_id, "TEST_SERIES");
        assert_eq!(block.frequency, "Monthly");
        assert_eq!(block.points.len(), 3);
        assert_eq!(block.points[0].value, 6.0);
    }

    #[test]
    fn test_latest_year_schedule() {
        let dates = vec![
            ReleaseDate { release_id: Some(50), release_name: None, date: date(2023, 10, 26) },
            ReleaseDate { release_id: Some(50), release_name: None, date: date(2024, 1, 25) },
            ReleaseDate { release_id: Some(50), release_name: None, date: date(2025, 1, 30) },
            ReleaseDate { release_id: Some(50), release_name: None, date: date(2025, 4, 30) },
        ];
        let kept = latest_year_schedule(dates);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|d| d.date.year() == 2025));
        assert!(latest_year_schedule(Vec::new()).is_empty());
    }

    #[test]
    fn test_find_release_by_name() {
        let releases = vec![
            release(10, "Consumer Price Index"),
            release(20, "H.4.1 Factors Affecting Reserve Balances"),
            release(21, "H.4.1 Weekly"),
        ];
        assert_eq!(find_release_by_name(&releases, "h.4.1").map(|r| r.id), Some(20));
        assert_eq!(find_release_by_name(&releases, "consumer").map(|r| r.id), Some(10));
        assert!(find_release_by_name(&releases, "Beige Book").is_none());
        assert!(find_release_by_name(&releases, "  ").is_none());
    }

    #[test]
    fn test_release_passthrough_fields() {
        let release: FredRelease = serde_json::from_value(json!({
            "id": 20,
            "name": "H.4.1",
            "press_release": true,
            "link": "http://www.federalreserve.gov/releases/h41/"
        }))
        .unwrap();
        assert_eq!(release.id, 20);
        assert_eq!(release.extra["press_release"], true);

        let back = serde_json::to_value(&release).unwrap();
        assert_eq!(back["link"], "http://www.federalreserve.gov/releases/h41/");
    }

    #[test]
    fn test_take_array() {
        let mut body = json!({"releases": [{"id": 1, "name": "A"}], "count": 1});
        let releases: Vec<FredRelease> = take_array(&mut body, "releases").unwrap();
        assert_eq!(releases.len(), 1);

        let mut empty = json!({"count": 0});
        let none: Vec<FredRelease> = take_array(&mut empty, "releases").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_upstream_error_message() {
        let body = r#"{"error_code":400,"error_message":"Bad Request.  The series does not exist."}"#;
        assert_eq!(
            upstream_error_message(body),
            "Bad Request.  The series does not exist."
        );
        assert_eq!(upstream_error_message("gateway down"), "gateway down");
    }

    #[test]
    fn test_unconfigured_source() {
        let source = FredSource::unconfigured();
        assert!(!source.is_configured());
        match source.api() {
            Err(ToolError::Configuration(msg)) => assert!(msg.contains("FRED_API_KEY")),
            _ => panic!("expected configuration error"),
        }
    }

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored (needs FRED_API_KEY)
    async fn test_live_snapshot() {
        let _ = dotenvy::dotenv();
        let config = ToolsConfig::from_env();
        let source = FredSource::from_config(&config, reqwest::Client::new());
        let snapshot = source
            .api()
            .unwrap()
            .series_snapshot("UNRATE", SNAPSHOT_LIMIT)
            .await
            .unwrap();
        assert!(!snapshot.observations().is_empty());
        assert_eq!(snapshot.frequency, "Monthly");
    }
}
