//! Per-turn conversation state and the side-channel payload types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::message::Message;

/// A chart image produced by a tool, passed through to the client untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment kind (always "image" today).
    #[serde(rename = "type")]
    pub kind: String,
    /// Encoded image, as a `data:` URI.
    pub source: String,
    /// Display title.
    pub title: String,
    /// Series the chart depicts.
    pub series_id: String,
    /// Units of the plotted values.
    #[serde(default)]
    pub units: String,
    /// Upstream URL the image was rendered from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_url: Option<String>,
}

impl Attachment {
    /// Create an image attachment.
    pub fn image(
        source: impl Into<String>,
        title: impl Into<String>,
        series_id: impl Into<String>,
    ) -> Self {
        Self {
            kind: "image".to_string(),
            source: source.into(),
            title: title.into(),
            series_id: series_id.into(),
            units: String::new(),
            chart_url: None,
        }
    }

    /// Set the units label.
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Set the upstream chart URL.
    pub fn with_chart_url(mut self, url: impl Into<String>) -> Self {
        self.chart_url = Some(url.into());
        self
    }
}

/// One observation of a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Observation date.
    pub date: NaiveDate,
    /// Observed value (never NaN).
    pub value: f64,
}

/// Structured time-series payload returned by a statistics tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataBlock {
    /// Series identifier.
    pub series_id: String,
    /// Series title.
    pub title: String,
    /// Units of the values.
    pub units: String,
    /// Observation frequency (e.g. "Monthly").
    pub frequency: String,
    /// Points in chronological order, oldest first.
    pub points: Vec<DataPoint>,
}

/// One scheduled publication date of a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDate {
    /// Release identifier, when the upstream includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_id: Option<u64>,
    /// Release name, when the upstream includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_name: Option<String>,
    /// Publication date.
    pub date: NaiveDate,
}

/// A ranked hit from the knowledge index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Index identifier of the hit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Document text.
    pub content: String,
    /// Remaining indexed fields.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            metadata: Map::new(),
        }
    }
}

/// Render documents as compact tagged text for prompts and tool results.
///
/// ```text
/// <documents>
/// <document series_id="UNRATE">
/// Series ID: UNRATE ...
/// </document>
/// </documents>
/// ```
pub fn format_documents(docs: &[Document]) -> String {
    if docs.is_empty() {
        return "<documents></documents>".to_string();
    }

    let mut out = String::from("<documents>\n");
    for doc in docs {
        out.push_str("<document");
        for (key, value) in &doc.metadata {
            match value {
                Value::String(s) => out.push_str(&format!(" {}=\"{}\"", key, s)),
                other => out.push_str(&format!(" {}={}", key, other)),
            }
        }
        out.push_str(">\n");
        out.push_str(doc.content.trim());
        out.push_str("\n</document>\n");
    }
    out.push_str("</documents>");
    out
}

/// Everything accumulated while processing one user turn.
///
/// The state is append-only: messages and side-channel outputs are added by
/// the dispatch loop and never removed before the turn ends.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    messages: Vec<Message>,
    retrieved_documents: Vec<Document>,
    issued_queries: Vec<String>,
    attachments: Vec<Attachment>,
    series_data: Vec<DataBlock>,
}

impl ConversationState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state seeded with prior conversation messages.
    pub fn with_history(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Append a message.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Record retrieved documents and the query that produced them.
    pub fn add_retrieval(&mut self, query: impl Into<String>, documents: Vec<Document>) {
        self.issued_queries.push(query.into());
        self.retrieved_documents.extend(documents);
    }

    /// Append chart attachments.
    pub fn add_attachments(&mut self, attachments: Vec<Attachment>) {
        self.attachments.extend(attachments);
    }

    /// Append data blocks.
    pub fn add_series_data(&mut self, blocks: Vec<DataBlock>) {
        self.series_data.extend(blocks);
    }

    /// All messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Documents retrieved so far this turn.
    pub fn retrieved_documents(&self) -> &[Document] {
        &self.retrieved_documents
    }

    /// Retrieval queries issued so far this turn.
    pub fn issued_queries(&self) -> &[String] {
        &self.issued_queries
    }

    /// Chart attachments produced so far this turn.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Data blocks produced so far this turn.
    pub fn series_data(&self) -> &[DataBlock] {
        &self.series_data
    }

    /// Consume the state, yielding its side-channel outputs.
    pub fn into_outputs(self) -> (Vec<Attachment>, Vec<DataBlock>) {
        (self.attachments, self.series_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_state_accumulates() {
        let mut state = ConversationState::with_history(vec![Message::user("earlier")]);
        state.push_message(Message::user("now"));
        state.add_retrieval("cpi", vec![Document::new("CPI doc")]);
        state.add_retrieval("gdp", vec![Document::new("GDP doc")]);
        state.add_attachments(vec![Attachment::image("data:x", "CPI", "CPIAUCSL")]);

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.issued_queries(), &["cpi".to_string(), "gdp".to_string()]);
        assert_eq!(state.retrieved_documents().len(), 2);
        assert_eq!(state.attachments()[0].kind, "image");
        assert_eq!(state.last_message().unwrap().content, "now");
    }

    #[test]
    fn test_data_point_serializes_iso_date() {
        let point = DataPoint {
            date: date(2024, 6, 1),
            value: 3.5,
        };
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json["date"], "2024-06-01");
        assert_eq!(json["value"], 3.5);
    }

    #[test]
    fn test_attachment_wire_shape() {
        let attachment = Attachment::image("data:image/png;base64,AAA", "CPI", "CPIAUCSL")
            .with_units("Index")
            .with_chart_url("https://example/chart.png");
        let json = serde_json::to_value(&attachment).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["series_id"], "CPIAUCSL");
        assert_eq!(json["chart_url"], "https://example/chart.png");
    }

    #[test]
    fn test_format_documents() {
        assert_eq!(format_documents(&[]), "<documents></documents>");

        let mut doc = Document::new("  Series ID: UNRATE  ");
        doc.metadata
            .insert("series_id".to_string(), Value::String("UNRATE".to_string()));
        doc.metadata.insert("chunk_index".to_string(), Value::from(0));

        let text = format_documents(&[doc]);
        assert!(text.starts_with("<documents>\n<document"));
        assert!(text.contains("series_id=\"UNRATE\""));
        assert!(text.contains("chunk_index=0"));
        assert!(text.contains("\nSeries ID: UNRATE\n</document>"));
        assert!(text.ends_with("</documents>"));
    }
}
