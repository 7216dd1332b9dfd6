//! Hand-built REST requests against the gateway.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use super::{SearchTransport, UploadTransport};
use crate::config::{headers, AppConfig};
use crate::error::{AlbumError, AlbumResult};
use crate::photos::{parse_search_response, PhotoRecord};
use crate::upload::UploadRequest;
use crate::utils::format_size;
use crate::{log_debug, log_error, log_info};

const MODULE: &str = "transport::rest";

pub struct RestTransport {
    client: Client,
    base_url: String,
    api_key: String,
    bucket: String,
}

impl RestTransport {
    pub fn new(config: &AppConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.api.base_url().to_string(),
            api_key: config.api.key.clone(),
            bucket: config.storage.bucket.clone(),
        }
    }

    /// `{base}/search?q=...` with the query percent-encoded once
    fn search_url(&self, query: &str) -> String {
        format!("{}/search?q={}", self.base_url, urlencoding::encode(query))
    }

    fn photos_url(&self) -> String {
        format!("{}/photos", self.base_url)
    }
}

#[async_trait]
impl SearchTransport for RestTransport {
    async fn search(&self, query: &str) -> AlbumResult<Vec<PhotoRecord>> {
        let url = self.search_url(query);
        log_debug!(MODULE, "GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(headers::API_KEY, &self.api_key)
            .send()
            .await
            .map_err(|e| {
                log_error!(MODULE, "Search request failed: {}", e);
                AlbumError::Network(format!("Search request failed: {}", e))
            })?;

        if !response.status().is_success() {
            log_error!(MODULE, "Search failed with status: {}", response.status());
            return Err(AlbumError::status(response.status()));
        }

        let body = response.bytes().await?;
        parse_search_response(&body)
    }
}

#[async_trait]
impl UploadTransport for RestTransport {
    async fn upload(&self, request: &UploadRequest<'_>) -> AlbumResult<()> {
        log_info!(
            MODULE,
            "PUT {} into bucket {} ({}, {})",
            request.file_name,
            self.bucket,
            request.content_type,
            format_size(request.file_bytes.len() as u64)
        );

        let response = self
            .client
            .put(self.photos_url())
            .query(&[("bucket", self.bucket.as_str()), ("key", request.file_name)])
            .header(headers::API_KEY, &self.api_key)
            .header(CONTENT_TYPE, &request.content_type)
            .header(headers::CUSTOM_LABELS, request.labels_header()?)
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Headers", headers::ALLOWED_HEADERS)
            .header("Access-Control-Allow-Methods", headers::ALLOWED_METHODS)
            .body(request.file_bytes.to_vec())
            .send()
            .await
            .map_err(|e| {
                log_error!(MODULE, "Upload request failed: {}", e);
                AlbumError::Network(format!("Upload request failed: {}", e))
            })?;

        if !response.status().is_success() {
            log_error!(MODULE, "Upload failed with status: {}", response.status());
            return Err(AlbumError::status(response.status()));
        }

        log_info!(MODULE, "Upload accepted: {}", request.file_name);
        Ok(())
    }
}
