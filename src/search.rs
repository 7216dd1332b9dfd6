//! Search module
//!
//! Issues photo searches through the configured transport. Every request is
//! tagged with a sequence number so callers can tell which response belongs
//! to the most recent query.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::AlbumResult;
use crate::photos::PhotoRecord;
use crate::transport::SearchTransport;
use crate::log_info;

const MODULE: &str = "search";

/// A search result with the sequence number of its request
#[derive(Debug)]
pub struct TaggedResults {
    pub sequence: u64,
    pub result: AlbumResult<Vec<PhotoRecord>>,
}

pub struct SearchClient {
    transport: Arc<dyn SearchTransport>,
    next_sequence: AtomicU64,
}

impl SearchClient {
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            transport,
            next_sequence: AtomicU64::new(1),
        }
    }

    /// Search for `query` (may be empty), tagged with a number that
    /// increases with every request issued by this client. Failures are
    /// not retried.
    pub async fn search_tagged(&self, query: &str) -> TaggedResults {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);
        log_info!(MODULE, "Search #{} for {:?}", sequence, query);

        let result = self.transport.search(query).await;
        if let Ok(records) = &result {
            log_info!(MODULE, "Search #{} returned {} records", sequence, records.len());
        }
        TaggedResults { sequence, result }
    }
}
