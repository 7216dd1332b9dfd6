//! Per-card image loading
//!
//! Every card owns one [`ImageLoadAttempt`]. A failed fetch is retried with
//! exponential backoff and a cache-busting `?retry=N` parameter until the
//! retry budget is spent, after which the card shows a permanent failure.
//!
//! ```text
//! Loading --success--> Loaded                          (terminal)
//! Loading --failure, n <= max--> ScheduledRetry --timer--> Loading
//! Loading --failure, n >  max--> Failed                (terminal)
//! ```

use async_trait::async_trait;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;

use super::{CardId, LoadedImage, ResultsView};
use crate::config::{images, ImageConfig};
use crate::error::{AlbumError, AlbumResult};
use crate::utils::append_query_param;
use crate::{log_debug, log_info, log_warn};

const MODULE: &str = "render::loader";

/// Fetches image bytes for a URL
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> AlbumResult<Vec<u8>>;
}

/// Fetches over HTTP and accepts only bodies that look like an image:
/// either the server declares an `image/*` type (SVG has no magic bytes) or
/// the bytes carry a known image signature.
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> AlbumResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AlbumError::Network(format!("Image request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AlbumError::status(response.status()));
        }

        let declared_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim().to_ascii_lowercase().starts_with("image/"));

        let bytes = response.bytes().await?.to_vec();
        if !declared_image {
            image::guess_format(&bytes)
                .map_err(|e| AlbumError::Parse(format!("Not a decodable image: {}", e)))?;
        }
        Ok(bytes)
    }
}

/// Bounded exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: images::MAX_RETRIES,
            base_delay: Duration::from_millis(images::BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ImageConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Delay before retry number `retry` (1-based): base * 2^(retry-1)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.checked_mul(factor).unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    ScheduledRetry,
    Loaded,
    Failed,
}

/// State of one card's image
#[derive(Debug, Clone)]
pub struct ImageLoadAttempt {
    target_url: String,
    retry_count: u32,
    status: LoadStatus,
    policy: RetryPolicy,
}

impl ImageLoadAttempt {
    pub fn new(target_url: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            target_url: target_url.into(),
            retry_count: 0,
            status: LoadStatus::Loading,
            policy,
        }
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// URL for the current fetch; retries carry `retry=N` to bypass caches
    pub fn current_url(&self) -> String {
        if self.retry_count == 0 {
            self.target_url.clone()
        } else {
            append_query_param(
                &self.target_url,
                images::RETRY_PARAM,
                &self.retry_count.to_string(),
            )
        }
    }

    /// Fetch succeeded. Returns true only on the transition into `Loaded`.
    pub fn on_success(&mut self) -> bool {
        if self.status != LoadStatus::Loading {
            return false;
        }
        self.status = LoadStatus::Loaded;
        true
    }

    /// Fetch failed. Returns the backoff delay when a retry is scheduled,
    /// `None` once the attempt has failed for good.
    pub fn on_failure(&mut self) -> Option<Duration> {
        if self.status != LoadStatus::Loading {
            return None;
        }
        self.retry_count += 1;
        if self.retry_count <= self.policy.max_retries {
            self.status = LoadStatus::ScheduledRetry;
            Some(self.policy.delay_for(self.retry_count))
        } else {
            self.retry_count = self.policy.max_retries;
            self.status = LoadStatus::Failed;
            None
        }
    }

    /// Retry timer fired
    pub fn on_timer(&mut self) {
        if self.status == LoadStatus::ScheduledRetry {
            self.status = LoadStatus::Loading;
        }
    }
}

/// Drive `attempt` to a terminal state, reporting the result to `card`
pub async fn run(
    mut attempt: ImageLoadAttempt,
    fetcher: Arc<dyn ImageFetcher>,
    view: Arc<dyn ResultsView>,
    card: CardId,
) -> LoadStatus {
    loop {
        let url = attempt.current_url();
        match fetcher.fetch(&url).await {
            Ok(bytes) => {
                if attempt.on_success() {
                    log_debug!(MODULE, "Card {} loaded {} ({} bytes)", card, url, bytes.len());
                    view.show_image(card, LoadedImage { url, bytes });
                }
                return attempt.status();
            }
            Err(e) => match attempt.on_failure() {
                Some(delay) => {
                    log_debug!(
                        MODULE,
                        "Card {} failed to load {}: {}; retry {} in {:?}",
                        card,
                        url,
                        e,
                        attempt.retry_count(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt.on_timer();
                }
                None => {
                    log_warn!(
                        MODULE,
                        "Card {} gave up on {} after {} retries: {}",
                        card,
                        attempt.target_url(),
                        attempt.retry_count(),
                        e
                    );
                    view.show_image_failed(card);
                    return attempt.status();
                }
            },
        }
    }
}

/// Final state of a loader, shareable between any number of waiters;
/// `None` if the loader was cancelled
pub type Completion = Shared<BoxFuture<'static, Option<LoadStatus>>>;

/// A running loader owned by its card. Dropping it cancels the load.
pub struct CardLoader {
    card: CardId,
    abort: AbortHandle,
    completion: Completion,
}

impl CardLoader {
    /// Start loading in the background
    pub fn spawn(
        attempt: ImageLoadAttempt,
        fetcher: Arc<dyn ImageFetcher>,
        view: Arc<dyn ResultsView>,
        card: CardId,
    ) -> Self {
        let handle = tokio::spawn(run(attempt, fetcher, view, card));
        let abort = handle.abort_handle();
        let completion = handle.map(|result| result.ok()).boxed().shared();
        Self {
            card,
            abort,
            completion,
        }
    }

    /// Stop the loader, including any pending retry timer
    pub fn cancel(&self) {
        if !self.abort.is_finished() {
            log_info!(MODULE, "Cancelling loader for card {}", self.card);
        }
        self.abort.abort();
    }

    /// Wait for the final state. Dropping the returned future does not
    /// detach the loader; it stays cancellable through `self`.
    pub fn settled(&self) -> Completion {
        self.completion.clone()
    }
}

impl Drop for CardLoader {
    fn drop(&mut self) {
        self.abort.abort();
    }
}
