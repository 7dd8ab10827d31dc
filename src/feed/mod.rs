//! Feed assembly: raw post records in, display-ready view records out.

pub mod labels;

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};

/// A stored post record as handed over by the record store.
pub type RawRecord = Map<String, Value>;

/// Textual shape every `date_added` is normalized through.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("post record is missing field `{0}`")]
    MissingField(&'static str),

    #[error("post record field `{0}` is not a string")]
    InvalidField(&'static str),

    #[error("malformed labels: {0}")]
    Labels(#[from] serde_json::Error),

    #[error("malformed timestamp {value:?}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// A post ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub author_name: String,
    pub date_added: NaiveDateTime,
    pub image_url: String,
    pub description: String,
    pub image_name: String,
    pub labels: Vec<String>,
}

/// Turn raw post records into view records.
///
/// Input order is preserved; callers fetch records newest first. Any bad
/// record fails the whole batch.
pub fn assemble<I>(records: I) -> Result<Vec<PostView>, FeedError>
where
    I: IntoIterator<Item = RawRecord>,
{
    records.into_iter().map(|record| to_view(&record)).collect()
}

fn to_view(record: &RawRecord) -> Result<PostView, FeedError> {
    Ok(PostView {
        author_name: text(record, "author_name")?.to_string(),
        date_added: normalize_timestamp(text(record, "date_added")?)?,
        image_url: text(record, "image_url")?.to_string(),
        description: text(record, "description")?.to_string(),
        image_name: text(record, "image_name")?.to_string(),
        labels: labels::decode(text(record, "labels")?)?,
    })
}

fn text<'a>(record: &'a RawRecord, field: &'static str) -> Result<&'a str, FeedError> {
    match record.get(field) {
        None | Some(Value::Null) => Err(FeedError::MissingField(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(FeedError::InvalidField(field)),
    }
}

/// Round-trip a raw timestamp through [`DISPLAY_FORMAT`].
///
/// Drops sub-second precision and any UTC offset (the wall-clock time is kept).
pub fn normalize_timestamp(raw: &str) -> Result<NaiveDateTime, FeedError> {
    let parsed = parse_raw(raw).map_err(|source| FeedError::Timestamp {
        value: raw.to_string(),
        source,
    })?;

    let display = parsed.format(DISPLAY_FORMAT).to_string();
    NaiveDateTime::parse_from_str(&display, DISPLAY_FORMAT).map_err(|source| {
        FeedError::Timestamp {
            value: display,
            source,
        }
    })
}

fn parse_raw(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_local());
    }
    // `%.f` also matches a missing fraction.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
}
