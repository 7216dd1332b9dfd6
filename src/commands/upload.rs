//! Upload command
//!
//! Holds the upload form: the selected file, the custom labels text and the
//! status line shown to the user.

use std::path::Path;

use crate::config::messages;
use crate::error::{AlbumError, AlbumResult};
use crate::upload::{SelectedFile, UploadClient};
use crate::{log_error, log_info, log_warn};

const MODULE: &str = "commands::upload";

pub struct UploadForm {
    client: UploadClient,
    selected: Option<SelectedFile>,
    custom_labels: String,
    status: String,
}

impl UploadForm {
    pub fn new(client: UploadClient) -> Self {
        Self {
            client,
            selected: None,
            custom_labels: String::new(),
            status: String::new(),
        }
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        log_info!(MODULE, "Selected file: {}", file.name);
        self.selected = Some(file);
    }

    /// Select a file from disk. A file that cannot be read leaves nothing
    /// selected, so the next submit reports the missing selection.
    pub async fn select_path(&mut self, path: &Path) -> AlbumResult<()> {
        match SelectedFile::from_path(path).await {
            Ok(file) => {
                self.select_file(file);
                Ok(())
            }
            Err(e) => {
                log_warn!(MODULE, "Cannot read {}: {}", path.display(), e);
                self.selected = None;
                Err(e)
            }
        }
    }

    pub fn set_custom_labels(&mut self, labels: impl Into<String>) {
        self.custom_labels = labels.into();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Upload the selected file.
    ///
    /// On success the selection and labels are cleared. On failure they are
    /// kept and the status shows a generic error; validation failures show
    /// their own message.
    pub async fn submit(&mut self) -> Result<(), AlbumError> {
        let result = self
            .client
            .upload(self.selected.as_ref(), &self.custom_labels)
            .await;

        match &result {
            Ok(()) => {
                log_info!(MODULE, "Photo uploaded successfully");
                self.status = messages::UPLOAD_OK.to_string();
                self.selected = None;
                self.custom_labels.clear();
            }
            Err(AlbumError::Validation(message)) => {
                self.status = message.clone();
            }
            Err(e) => {
                log_error!(MODULE, "Error uploading photo: {}", e);
                self.status = messages::UPLOAD_FAILED.to_string();
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::UploadTransport;
    use crate::upload::{ContentTypePolicy, UploadRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingTransport {
        calls: AtomicUsize,
        succeed: bool,
    }

    impl CountingTransport {
        fn new(succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                succeed,
            })
        }
    }

    #[async_trait]
    impl UploadTransport for CountingTransport {
        async fn upload(&self, _request: &UploadRequest<'_>) -> AlbumResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err(AlbumError::Network("request failed with status: 500".to_string()))
            }
        }
    }

    fn form(transport: Arc<CountingTransport>) -> UploadForm {
        UploadForm::new(UploadClient::new(transport, ContentTypePolicy::Extension))
    }

    fn photo() -> SelectedFile {
        SelectedFile::new("cat.jpg", b"JPEGDATA".to_vec(), Some("image/jpeg".to_string()))
    }

    #[tokio::test]
    async fn test_no_file_reports_validation_without_request() {
        let transport = CountingTransport::new(true);
        let mut form = form(transport.clone());
        form.set_custom_labels("cat");

        assert!(form.submit().await.is_err());
        assert_eq!(form.status(), "Please select a file");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert_eq!(form.custom_labels, "cat");
    }

    #[tokio::test]
    async fn test_success_clears_inputs() {
        let transport = CountingTransport::new(true);
        let mut form = form(transport.clone());
        form.select_file(photo());
        form.set_custom_labels("cat, sunset");

        form.submit().await.unwrap();

        assert_eq!(form.status(), "Photo uploaded successfully!");
        assert!(form.selected.is_none());
        assert_eq!(form.custom_labels, "");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreadable_path_reports_missing_file() {
        let transport = CountingTransport::new(true);
        let mut form = form(transport.clone());
        form.select_file(photo());
        let dir = tempfile::tempdir().unwrap();

        assert!(form.select_path(&dir.path().join("nope.jpg")).await.is_err());
        assert!(form.selected.is_none());

        assert!(form.submit().await.is_err());
        assert_eq!(form.status(), "Please select a file");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_select_path_reads_file() {
        let transport = CountingTransport::new(true);
        let mut form = form(transport.clone());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("beach.png");
        std::fs::write(&path, b"PNGDATA").unwrap();

        form.select_path(&path).await.unwrap();
        assert_eq!(form.selected.as_ref().map(|f| f.name.as_str()), Some("beach.png"));

        form.submit().await.unwrap();
        assert_eq!(form.status(), "Photo uploaded successfully!");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_keeps_inputs_and_does_not_retry() {
        let transport = CountingTransport::new(false);
        let mut form = form(transport.clone());
        form.select_file(photo());
        form.set_custom_labels("cat");

        assert!(form.submit().await.is_err());

        assert_eq!(form.status(), "Error uploading photo");
        assert!(form.selected.is_some());
        assert_eq!(form.custom_labels, "cat");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
