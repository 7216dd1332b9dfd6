//! Photo records
//!
//! Parsing search responses and locating stored objects.

mod models;

pub use models::{CreatedTimestamp, PhotoRecord, SearchResponse};

use crate::config::StorageConfig;
use crate::error::AlbumResult;
use crate::{log_debug, log_error};

const MODULE: &str = "photos";

/// Parse a search response body into its records
pub fn parse_search_response(body: &[u8]) -> AlbumResult<Vec<PhotoRecord>> {
    let response: SearchResponse = serde_json::from_slice(body).map_err(|e| {
        log_error!(MODULE, "Failed to parse search response: {}", e);
        e
    })?;
    let records = records_from(response);
    log_debug!(MODULE, "Parsed {} records", records.len());
    Ok(records)
}

/// Flatten hits into their `_source` records
pub fn records_from(response: SearchResponse) -> Vec<PhotoRecord> {
    response
        .results
        .unwrap_or_default()
        .into_iter()
        .map(|hit| hit.source)
        .collect()
}

/// Builds public object URLs from a `{bucket}`/`{key}` template
#[derive(Debug, Clone)]
pub struct ObjectLocator {
    template: String,
    default_bucket: String,
}

impl ObjectLocator {
    pub fn new(storage: &StorageConfig) -> Self {
        Self {
            template: storage.object_url_template.clone(),
            default_bucket: storage.bucket.clone(),
        }
    }

    /// URL of the record's object. The record's own bucket wins over the
    /// configured one.
    pub fn object_url(&self, record: &PhotoRecord) -> String {
        let bucket = record
            .bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.default_bucket);
        self.template
            .replace("{bucket}", bucket)
            .replace("{key}", &record.object_key)
    }
}
