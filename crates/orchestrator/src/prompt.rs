//! System prompt for the economics assistant.

use std::env;
use std::path::Path;

use agent_core::{format_documents, Document};
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

/// Default path for the system prompt file.
pub const DEFAULT_PROMPT_FILE: &str = "SYSTEM_PROMPT.md";

/// Series the engine may chart or query without retrieval first.
pub const POPULAR_SERIES: &[(&str, &str)] = &[
    ("CPIAUCSL", "Consumer Price Index for All Urban Consumers"),
    ("UNRATE", "Unemployment Rate"),
    ("FEDFUNDS", "Effective Federal Funds Rate"),
    ("GDP", "Gross Domestic Product"),
    ("PCE", "Personal Consumption Expenditures"),
    ("M2SL", "M2 Money Stock"),
    ("DGS10", "10-Year Treasury Constant Maturity Rate"),
    ("GS1", "1-Year Treasury Constant Maturity Rate"),
    ("DTB3", "3-Month Treasury Bill: Secondary Market Rate"),
    ("T10YIE", "10-Year Breakeven Inflation Rate"),
    ("CSUSHPINSA", "Case-Shiller Home Price Index"),
    ("HOUST", "Housing Starts"),
];

/// Placeholder replaced with the current UTC time.
pub const SYSTEM_TIME_PLACEHOLDER: &str = "{system_time}";

/// Placeholder replaced with the documents retrieved so far.
pub const RETRIEVED_DOCS_PLACEHOLDER: &str = "{retrieved_docs}";

/// Placeholder replaced with the popular series ids.
pub const POPULAR_SERIES_PLACEHOLDER: &str = "{popular_series}";

/// Default system prompt template (fallback if no file or env override).
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an economics assistant who reasons step-by-step, calling tools when helpful.

Tools available:
- retrieve_documents(query): search the indexed knowledge base. Use this when the user references uploaded content or asks for something beyond live FRED data.
- fred_chart(series_id): render a chart for a FRED series. Use this for requests that explicitly want a plot or visualization.
- fred_recent_data(series_id, latest_points): fetch the latest datapoints for a FRED series. Use this when the user needs numeric values or trends.
- fred_series_release_schedule(series_id): upcoming and recent publication dates for the release that contains a series.
- fred_release_structure(release_name): metadata and table layout of a named release such as "H.4.1".
- fred_search_series(query): find FRED series ids when you do not know the exact identifier.
- fraser_search_fomc_titles(query): find FOMC meeting documents in the FRASER archive.

Popular series you can reference quickly: {popular_series}.
If a query clearly targets one of these series, you can call the relevant FRED tool directly without retrieval.
If the question mixes popular series with other context, prefer to run retrieval as well to avoid missing information.

When you are confident you can answer, respond directly in natural language.
Do not fabricate tool outputs. Only describe information returned by tools or retrieved documents.

System time: {system_time}
Retrieved documents snapshot:
{retrieved_docs}"#;

/// Load the system prompt template.
///
/// Order: `AGENT_SYSTEM_PROMPT` inline, then the file named by
/// `AGENT_PROMPT_FILE` (default `SYSTEM_PROMPT.md`), then the embedded default.
pub fn load_system_prompt() -> String {
    if let Ok(prompt) = env::var("AGENT_SYSTEM_PROMPT") {
        if !prompt.trim().is_empty() {
            info!("Using system prompt from AGENT_SYSTEM_PROMPT env var");
            return prompt;
        }
    }

    let prompt_file =
        env::var("AGENT_PROMPT_FILE").unwrap_or_else(|_| DEFAULT_PROMPT_FILE.to_string());

    if let Some(prompt) = load_prompt_file(&prompt_file) {
        info!("Loaded system prompt from {}", prompt_file);
        return prompt;
    }

    info!("Using embedded default system prompt");
    DEFAULT_SYSTEM_PROMPT.to_string()
}

/// Read a prompt file, returning `None` when it is missing or blank.
fn load_prompt_file(path: impl AsRef<Path>) -> Option<String> {
    let path = path.as_ref();

    match std::fs::read_to_string(path) {
        Ok(content) => {
            let trimmed = content.trim();
            if trimmed.is_empty() {
                warn!("Prompt file {} is empty, ignoring", path.display());
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => None,
    }
}

/// Comma-separated popular series ids.
pub fn popular_series_text() -> String {
    POPULAR_SERIES
        .iter()
        .map(|(id, _)| *id)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Fill the template for one reasoning step.
pub fn render_system_prompt(template: &str, now: DateTime<Utc>, documents: &[Document]) -> String {
    template
        .replace(POPULAR_SERIES_PLACEHOLDER, &popular_series_text())
        .replace(
            SYSTEM_TIME_PLACEHOLDER,
            &now.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
        .replace(RETRIEVED_DOCS_PLACEHOLDER, &format_documents(documents))
}
