//! Generated-client style access to the gateway
//!
//! Operations are invoked by name with a parameter map and additional
//! headers, the way an SDK generated from the API definition exposes them.
//! Parameters are sent as structured query pairs rather than a hand-built
//! URL.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};

use super::{SearchTransport, UploadTransport};
use crate::config::{headers, AppConfig};
use crate::error::{AlbumError, AlbumResult};
use crate::photos::{parse_search_response, PhotoRecord};
use crate::upload::UploadRequest;
use crate::{log_debug, log_error, log_info};

const MODULE: &str = "transport::gateway";

/// Response of a successful operation
#[derive(Debug)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub data: Vec<u8>,
}

/// Thin client over the gateway's `searchGet` and `photosPut` operations
pub struct GatewayClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GatewayClient {
    pub fn new(base_url: &str, api_key: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// `GET /search` with `q` in `params`
    pub async fn search_get(&self, params: &[(&str, &str)]) -> AlbumResult<GatewayResponse> {
        self.invoke(Method::GET, "/search", params, HeaderMap::new(), None)
            .await
    }

    /// `PUT /photos` with `bucket` and `key` in `params`
    pub async fn photos_put(
        &self,
        params: &[(&str, &str)],
        body: Vec<u8>,
        additional_headers: HeaderMap,
    ) -> AlbumResult<GatewayResponse> {
        self.invoke(Method::PUT, "/photos", params, additional_headers, Some(body))
            .await
    }

    /// Invoke an operation. Any non-2xx status is an error.
    async fn invoke(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        additional_headers: HeaderMap,
        body: Option<Vec<u8>>,
    ) -> AlbumResult<GatewayResponse> {
        let url = format!("{}{}", self.base_url, path);
        log_debug!(MODULE, "{} {} ({} params)", method, url, params.len());

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .query(params)
            .header(headers::API_KEY, &self.api_key)
            .headers(additional_headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            log_error!(MODULE, "{} {} failed: {}", method, path, e);
            AlbumError::Network(format!("{} {} failed: {}", method, path, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            log_error!(MODULE, "{} {} returned status: {}", method, path, status);
            return Err(AlbumError::status(status));
        }

        let data = response.bytes().await?.to_vec();
        Ok(GatewayResponse { status, data })
    }
}

/// Search and upload through [`GatewayClient`]
pub struct GatewayTransport {
    gateway: GatewayClient,
    bucket: String,
}

impl GatewayTransport {
    pub fn new(config: &AppConfig, client: Client) -> Self {
        Self {
            gateway: GatewayClient::new(config.api.base_url(), &config.api.key, client),
            bucket: config.storage.bucket.clone(),
        }
    }
}

#[async_trait]
impl SearchTransport for GatewayTransport {
    async fn search(&self, query: &str) -> AlbumResult<Vec<PhotoRecord>> {
        let response = self.gateway.search_get(&[("q", query)]).await?;
        parse_search_response(&response.data)
    }
}

#[async_trait]
impl UploadTransport for GatewayTransport {
    async fn upload(&self, request: &UploadRequest<'_>) -> AlbumResult<()> {
        let mut additional_headers = HeaderMap::new();
        let content_type = HeaderValue::from_str(&request.content_type).map_err(|_| {
            AlbumError::Validation(format!("Invalid content type: {}", request.content_type))
        })?;
        additional_headers.insert(CONTENT_TYPE, content_type);
        let labels_name = HeaderName::from_bytes(headers::CUSTOM_LABELS.as_bytes())
            .map_err(|e| AlbumError::Config(format!("{}: {}", headers::CUSTOM_LABELS, e)))?;
        additional_headers.insert(labels_name, request.labels_header()?);

        let params = [("bucket", self.bucket.as_str()), ("key", request.file_name)];
        let response = self
            .gateway
            .photos_put(&params, request.file_bytes.to_vec(), additional_headers)
            .await?;

        log_info!(
            MODULE,
            "Upload of {} accepted with status {}",
            request.file_name,
            response.status
        );
        Ok(())
    }
}
