// src/model.rs
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One scraped article as held by the document store.
///
/// `source` is write-once from the tagger's point of view: it is only ever
/// set on records where it is still absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub url: String,
    /// Publication time, local wall clock. Values that cannot be read as a
    /// timestamp become `None` instead of failing the document.
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Article {
    /// Untagged article with only a url and a date; handy for seeding stores.
    pub fn new(url: impl Into<String>, date: NaiveDateTime) -> Self {
        Self {
            id: None,
            url: url.into(),
            date: Some(date),
            source: None,
            title: None,
            content: None,
        }
    }

    pub fn with_text(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self.content = Some(content.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_tagged(&self) -> bool {
        self.source.is_some()
    }
}

/// Accepts a plain string id or an extended-JSON `{"$oid": "..."}`.
fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str).map(str::to_string),
        _ => None,
    })
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
    Ok(parse_date_value(&Value::deserialize(d)?))
}

/// Best-effort timestamp reading:
/// - naive `YYYY-MM-DDTHH:MM:SS[.f]` (or with a space), taken as local time
/// - RFC 3339 with `Z` or an offset, converted to local time
/// - bare `YYYY-MM-DD`, at midnight
/// - extended JSON `{"$date": <string | epoch millis | {"$numberLong": ..}>}`
///
/// Anything else is `None`.
pub fn parse_date_value(v: &Value) -> Option<NaiveDateTime> {
    match v {
        Value::String(s) => parse_date_str(s),
        Value::Object(map) => match map.get("$date")? {
            Value::Number(n) => n.as_i64().and_then(from_epoch_millis),
            Value::Object(inner) => inner
                .get("$numberLong")
                .and_then(Value::as_str)
                .and_then(|s| s.parse().ok())
                .and_then(from_epoch_millis),
            other => parse_date_value(other),
        },
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn from_epoch_millis(ms: i64) -> Option<NaiveDateTime> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.naive_local())
}
