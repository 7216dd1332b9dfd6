//! Application state
//!
//! Builds the search page and the upload form from one configuration.

use std::sync::Arc;

use super::search::SearchPage;
use super::upload::UploadForm;
use crate::config::AppConfig;
use crate::error::AlbumResult;
use crate::photos::ObjectLocator;
use crate::render::{HttpImageFetcher, ResultRenderer, ResultsView, RetryPolicy};
use crate::search::SearchClient;
use crate::transport::{search_transport, upload_transport};
use crate::upload::UploadClient;
use crate::utils::{resolve_locale, DateFormatter};
use crate::log_debug;

const MODULE: &str = "commands::state";

pub struct AppState {
    pub search: SearchPage,
    pub upload: UploadForm,
}

impl AppState {
    /// Wire every component from `config`, rendering results into `view`
    pub fn new(config: &AppConfig, view: Arc<dyn ResultsView>) -> AlbumResult<Self> {
        let client = config.http_client()?;

        let locale = resolve_locale(config.display.locale.as_deref());
        log_debug!(MODULE, "Formatting dates for locale {}", locale);

        let renderer = ResultRenderer::new(
            view,
            Arc::new(HttpImageFetcher::new(client.clone())),
            ObjectLocator::new(&config.storage),
            RetryPolicy::from_config(&config.images),
            DateFormatter::for_locale(&locale),
        );
        let search = SearchPage::new(
            SearchClient::new(search_transport(config, client.clone())),
            renderer,
            config.search.discard_stale_responses,
        );
        let upload = UploadForm::new(UploadClient::new(
            upload_transport(config, client),
            config.upload.content_type,
        ));

        Ok(Self { search, upload })
    }
}
