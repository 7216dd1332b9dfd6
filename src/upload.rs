//! Upload module
//!
//! Builds photo upload requests and hands them to the configured transport.

use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::config::messages;
use crate::error::{AlbumError, AlbumResult};
use crate::transport::UploadTransport;
use crate::utils::{format_size, get_file_extension};
use crate::{log_debug, log_error, log_info, log_warn};

const MODULE: &str = "upload";

/// Used when the declared type is requested but none is known
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Vec<u8>,
    /// Media type reported by whoever selected the file, if any
    pub declared_type: Option<String>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, declared_type: Option<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            declared_type,
        }
    }

    /// Read a local file. The name is the final path component.
    pub async fn from_path(path: &Path) -> AlbumResult<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                AlbumError::Validation(format!("Invalid file name: {}", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        log_debug!(
            MODULE,
            "Read {} ({})",
            path.display(),
            format_size(bytes.len() as u64)
        );
        Ok(Self::new(name, bytes, None))
    }
}

/// How the `Content-Type` of an upload is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentTypePolicy {
    /// `image/<extension>` from the file name; "image/No extension" without one
    Extension,
    /// The file's declared media type
    Declared,
}

impl ContentTypePolicy {
    pub fn content_type(&self, file: &SelectedFile) -> String {
        match self {
            ContentTypePolicy::Extension => format!("image/{}", get_file_extension(&file.name)),
            ContentTypePolicy::Declared => file
                .declared_type
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(FALLBACK_CONTENT_TYPE)
                .to_string(),
        }
    }
}

/// One upload, borrowed from the selected file for the duration of the call
#[derive(Debug)]
pub struct UploadRequest<'a> {
    pub file_name: &'a str,
    pub file_bytes: &'a [u8],
    pub content_type: String,
    /// Raw user text, passed through without parsing
    pub custom_labels: &'a str,
}

impl UploadRequest<'_> {
    /// Labels as a metadata header value
    pub fn labels_header(&self) -> AlbumResult<HeaderValue> {
        HeaderValue::from_str(self.custom_labels).map_err(|_| {
            AlbumError::Validation(
                "Custom labels contain characters that cannot be sent in a header".to_string(),
            )
        })
    }
}

/// Sends selected files through an [`UploadTransport`]
pub struct UploadClient {
    transport: Arc<dyn UploadTransport>,
    policy: ContentTypePolicy,
}

impl UploadClient {
    pub fn new(transport: Arc<dyn UploadTransport>, policy: ContentTypePolicy) -> Self {
        Self { transport, policy }
    }

    /// Upload `file` with the raw `custom_labels` text.
    ///
    /// Without a file this fails with a validation error and no request is
    /// made. Failures are not retried.
    pub async fn upload(&self, file: Option<&SelectedFile>, custom_labels: &str) -> AlbumResult<()> {
        let file = match file {
            Some(file) => file,
            None => {
                log_warn!(MODULE, "Upload requested without a file");
                return Err(AlbumError::Validation(messages::SELECT_FILE.to_string()));
            }
        };

        let request = UploadRequest {
            file_name: &file.name,
            file_bytes: &file.bytes,
            content_type: self.policy.content_type(file),
            custom_labels,
        };

        log_info!(
            MODULE,
            "Uploading {} as {} ({})",
            request.file_name,
            request.content_type,
            format_size(request.file_bytes.len() as u64)
        );

        self.transport.upload(&request).await.map_err(|e| {
            log_error!(MODULE, "Error uploading photo {}: {}", request.file_name, e);
            e
        })
    }
}
