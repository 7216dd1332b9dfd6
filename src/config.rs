//! Application configuration
//!
//! Compiled-in defaults live in the constant modules below. At startup they
//! are collected into one immutable [`AppConfig`], optionally overlaid by a
//! JSON file, and handed to every client that needs it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AlbumError, AlbumResult};
use crate::upload::ContentTypePolicy;
use crate::{log_debug, log_info};

const MODULE: &str = "config";

pub mod app {
    pub const NAME: &str = "photo-album";
    pub const USER_AGENT: &str = concat!("photo-album/", env!("CARGO_PKG_VERSION"));
    pub const CONFIG_FILE: &str = "config.json";
}

pub mod urls {
    /// API gateway stage serving `/search` and `/photos`
    pub const API_ENDPOINT: &str = "https://qjup4ril4e.execute-api.us-east-1.amazonaws.com/v4";
    /// Public object URL; `{bucket}` and `{key}` are substituted per photo
    pub const OBJECT_URL_TEMPLATE: &str = "https://{bucket}.s3.us-east-1.amazonaws.com/{key}";
}

pub mod storage {
    pub const BUCKET: &str = "photo-album-1";
}

pub mod images {
    pub const MAX_RETRIES: u32 = 3;
    pub const BASE_DELAY_MS: u64 = 1000;
    /// Cache-busting query parameter appended on retry
    pub const RETRY_PARAM: &str = "retry";
}

pub mod headers {
    pub const API_KEY: &str = "X-API-Key";
    pub const CUSTOM_LABELS: &str = "x-amz-meta-customLabels";
    pub const ALLOWED_HEADERS: &str = "Content-Type,X-Api-Key,x-amz-meta-customLabels";
    pub const ALLOWED_METHODS: &str = "PUT,OPTIONS";
}

pub mod messages {
    pub const NO_RESULTS: &str = "No images found";
    pub const SEARCH_FAILED: &str = "Error searching photos";
    pub const LOADING: &str = "Loading...";
    pub const IMAGE_FAILED: &str = "Image failed to load";
    pub const SELECT_FILE: &str = "Please select a file";
    pub const UPLOAD_OK: &str = "Photo uploaded successfully!";
    pub const UPLOAD_FAILED: &str = "Error uploading photo";
    pub const INVALID_DATE: &str = "Invalid Date";
}

/// Which adapter carries requests to the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Hand-built HTTP requests
    Rest,
    /// Generated-client style invocation (operation + parameter map)
    Gateway,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub key: String,
    /// No timeout beyond the transport's own when unset
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: urls::API_ENDPOINT.to_string(),
            key: String::new(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    /// Endpoint without a trailing slash
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    pub object_url_template: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: storage::BUCKET.to_string(),
            object_url_template: urls::OBJECT_URL_TEMPLATE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_retries: images::MAX_RETRIES,
            base_delay_ms: images::BASE_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub transport: TransportKind,
    /// Drop responses that arrive after a newer request has been rendered
    pub discard_stale_responses: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Rest,
            discard_stale_responses: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub transport: TransportKind,
    pub content_type: ContentTypePolicy,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::Rest,
            content_type: ContentTypePolicy::Extension,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Overrides the detected system locale (e.g. "de-DE")
    pub locale: Option<String>,
}

/// Immutable configuration shared by every component
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub images: ImageConfig,
    pub search: SearchConfig,
    pub upload: UploadConfig,
    pub display: DisplayConfig,
}

/// Default config file location: `<config_dir>/photo-album/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(app::NAME).join(app::CONFIG_FILE))
}

impl AppConfig {
    /// Build the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if present, otherwise the compiled-in defaults.
    pub fn load(path: Option<&Path>) -> AlbumResult<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    log_debug!(MODULE, "No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> AlbumResult<Self> {
        log_info!(MODULE, "Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            AlbumError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> AlbumResult<Self> {
        serde_json::from_str(content).map_err(|e| AlbumError::Config(e.to_string()))
    }

    pub fn validate(&self) -> AlbumResult<()> {
        reqwest::Url::parse(self.api.base_url()).map_err(|e| {
            AlbumError::Config(format!("api.endpoint '{}': {}", self.api.endpoint, e))
        })?;
        if !self.storage.object_url_template.contains("{key}") {
            return Err(AlbumError::Config(
                "storage.object_url_template must contain {key}".to_string(),
            ));
        }
        if self.storage.bucket.is_empty() {
            return Err(AlbumError::Config("storage.bucket is empty".to_string()));
        }
        if self.images.base_delay_ms == 0 {
            return Err(AlbumError::Config(
                "images.base_delay_ms must be positive".to_string(),
            ));
        }
        // 2^(n-1) must stay representable as a delay multiplier
        if self.images.max_retries > 16 {
            return Err(AlbumError::Config(
                "images.max_retries must be at most 16".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings that are valid but will make the gateway reject requests
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.api.key.trim().is_empty() {
            let location = default_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "the file passed with --config".to_string());
            warnings.push(format!(
                "api.key is not set; requests will be rejected. Add it to {}",
                location
            ));
        }
        warnings
    }

    /// Build the HTTP client every adapter shares
    pub fn http_client(&self) -> AlbumResult<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(app::USER_AGENT);
        if let Some(secs) = self.api.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| AlbumError::Network(format!("Failed to create HTTP client: {}", e)))
    }
}
