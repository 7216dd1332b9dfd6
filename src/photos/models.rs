//! Photo data models
//!
//! Types representing search responses and indexed photos.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw search response from the gateway
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    /// Absent or `null` means no hits
    #[serde(default)]
    pub results: Option<Vec<SearchHit>>,
}

/// One index hit; only the `_source` document is used
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_source")]
    pub source: PhotoRecord,
}

/// Indexed photo metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRecord {
    pub object_key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub labels: Vec<String>,
    #[serde(default)]
    pub created_timestamp: Option<CreatedTimestamp>,
    #[serde(default)]
    pub bucket: Option<String>,
}

/// Creation time as stored by the indexer: epoch millis or an ISO-8601 string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedTimestamp {
    Number(serde_json::Number),
    Text(String),
}

impl CreatedTimestamp {
    /// Calendar date of the timestamp in `tz`.
    ///
    /// Strings without an offset are taken as already local to `tz`.
    pub fn date_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        match self {
            CreatedTimestamp::Number(n) => {
                let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
                let utc = Utc.timestamp_millis_opt(millis).single()?;
                Some(utc.with_timezone(tz).date_naive())
            }
            CreatedTimestamp::Text(s) => {
                let s = s.trim();
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    return Some(dt.with_timezone(tz).date_naive());
                }
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                    return Some(naive.date());
                }
                NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
            }
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
