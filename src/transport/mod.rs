//! Transports to the photo gateway
//!
//! Search and upload each go through a trait so the hand-built REST
//! adapter and the generated-client adapter are interchangeable.

mod gateway;
mod rest;

pub use gateway::GatewayTransport;
pub use rest::RestTransport;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{AppConfig, TransportKind};
use crate::error::AlbumResult;
use crate::photos::PhotoRecord;
use crate::upload::UploadRequest;

#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Issue one search request. Never retried.
    async fn search(&self, query: &str) -> AlbumResult<Vec<PhotoRecord>>;
}

#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// PUT the photo with its content type and labels metadata. Never retried.
    async fn upload(&self, request: &UploadRequest<'_>) -> AlbumResult<()>;
}

/// Search adapter selected by configuration
pub fn search_transport(
    config: &AppConfig,
    client: reqwest::Client,
) -> Arc<dyn SearchTransport> {
    match config.search.transport {
        TransportKind::Rest => Arc::new(RestTransport::new(config, client)),
        TransportKind::Gateway => Arc::new(GatewayTransport::new(config, client)),
    }
}

/// Upload adapter selected by configuration
pub fn upload_transport(
    config: &AppConfig,
    client: reqwest::Client,
) -> Arc<dyn UploadTransport> {
    match config.upload.transport {
        TransportKind::Rest => Arc::new(RestTransport::new(config, client)),
        TransportKind::Gateway => Arc::new(GatewayTransport::new(config, client)),
    }
}
