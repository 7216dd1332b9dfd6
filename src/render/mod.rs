//! Result rendering
//!
//! Turns search results into cards. Each card gets its placeholder
//! immediately and then loads its image independently of every other card.

pub mod loader;
mod view;

pub use loader::{CardLoader, HttpImageFetcher, ImageFetcher, LoadStatus, RetryPolicy};
pub use view::{ImageSlot, MemoryView};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::config::messages;
use crate::photos::{ObjectLocator, PhotoRecord};
use crate::utils::{join_labels, DateFormatter};
use crate::{log_debug, log_info};
use loader::ImageLoadAttempt;

const MODULE: &str = "render";

/// Identifies a card within one render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CardId {
    pub generation: u64,
    pub index: usize,
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.generation, self.index)
    }
}

/// Static content of a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub object_key: String,
    pub image_url: String,
    /// Labels joined with ", "
    pub labels: String,
    /// Date only, localized
    pub created: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub url: String,
    pub bytes: Vec<u8>,
}

/// The page area showing search results.
///
/// Updates for a card that is no longer shown must be ignored.
pub trait ResultsView: Send + Sync {
    /// Remove all cards and messages
    fn clear(&self);
    /// Show a single message in place of results
    fn show_message(&self, message: &str);
    /// Append a card with its image placeholder
    fn add_card(&self, id: CardId, card: &Card);
    /// Replace the card's placeholder with the image
    fn show_image(&self, id: CardId, image: LoadedImage);
    /// Replace the card's placeholder with a failure indicator
    fn show_image_failed(&self, id: CardId);
}

pub struct ResultRenderer {
    view: Arc<dyn ResultsView>,
    fetcher: Arc<dyn ImageFetcher>,
    locator: ObjectLocator,
    policy: RetryPolicy,
    dates: DateFormatter,
    generation: u64,
    loaders: Vec<CardLoader>,
}

impl ResultRenderer {
    pub fn new(
        view: Arc<dyn ResultsView>,
        fetcher: Arc<dyn ImageFetcher>,
        locator: ObjectLocator,
        policy: RetryPolicy,
        dates: DateFormatter,
    ) -> Self {
        Self {
            view,
            fetcher,
            locator,
            policy,
            dates,
            generation: 0,
            loaders: Vec::new(),
        }
    }

    /// Replace whatever is shown with `records`. Returns the number of cards.
    ///
    /// Must be called inside a Tokio runtime; image loaders are spawned.
    pub fn render(&mut self, records: Option<&[PhotoRecord]>) -> usize {
        self.unmount();

        let records = match records {
            Some(records) if !records.is_empty() => records,
            _ => {
                log_info!(MODULE, "No results to render");
                self.view.show_message(messages::NO_RESULTS);
                return 0;
            }
        };

        log_info!(
            MODULE,
            "Rendering {} cards (pass {})",
            records.len(),
            self.generation
        );

        for (index, record) in records.iter().enumerate() {
            let id = CardId {
                generation: self.generation,
                index,
            };
            let image_url = self.locator.object_url(record);
            let card = Card {
                object_key: record.object_key.clone(),
                image_url: image_url.clone(),
                labels: join_labels(&record.labels),
                created: self.dates.format_timestamp(record.created_timestamp.as_ref()),
            };
            self.view.add_card(id, &card);

            let attempt = ImageLoadAttempt::new(image_url, self.policy);
            self.loaders.push(CardLoader::spawn(
                attempt,
                self.fetcher.clone(),
                self.view.clone(),
                id,
            ));
        }

        records.len()
    }

    /// Replace results with an error message
    pub fn show_error(&mut self, message: &str) {
        self.unmount();
        self.view.show_message(message);
    }

    /// Wait for every loader of the current pass to finish or be cancelled.
    ///
    /// The returned future borrows nothing; the loaders stay owned by the
    /// renderer so a later render still cancels them.
    pub fn settle(&self) -> impl Future<Output = Vec<LoadStatus>> + Send + 'static {
        let pending: Vec<_> = self.loaders.iter().map(CardLoader::settled).collect();
        async move {
            futures_util::future::join_all(pending)
                .await
                .into_iter()
                .flatten()
                .collect()
        }
    }

    /// Cancel loaders of the current cards and clear the view
    fn unmount(&mut self) {
        if !self.loaders.is_empty() {
            log_debug!(MODULE, "Unmounting {} cards", self.loaders.len());
        }
        for loader in self.loaders.drain(..) {
            loader.cancel();
        }
        self.generation += 1;
        self.view.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::error::{AlbumError, AlbumResult};
    use crate::photos::CreatedTimestamp;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::time::Duration;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    /// Serves keys listed in `good`, fails everything else
    struct KeyFetcher {
        good: HashSet<String>,
        calls: Mutex<Vec<String>>,
    }

    impl KeyFetcher {
        fn new(good: &[&str]) -> Self {
            Self {
                good: good.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ImageFetcher for KeyFetcher {
        async fn fetch(&self, url: &str) -> AlbumResult<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            let key = url.rsplit('/').next().unwrap_or("");
            let key = key.split('?').next().unwrap_or("");
            if self.good.contains(key) {
                Ok(PNG.to_vec())
            } else {
                Err(AlbumError::Network("404".to_string()))
            }
        }
    }

    fn record(key: &str, labels: &[&str]) -> PhotoRecord {
        PhotoRecord {
            object_key: key.to_string(),
            labels: labels.iter().map(|s| s.to_string()).collect(),
            created_timestamp: Some(CreatedTimestamp::Number(1700000000000i64.into())),
            bucket: None,
        }
    }

    fn renderer(view: Arc<MemoryView>, fetcher: Arc<KeyFetcher>) -> ResultRenderer {
        ResultRenderer::new(
            view,
            fetcher,
            ObjectLocator::new(&StorageConfig {
                bucket: "album".to_string(),
                object_url_template: "https://{bucket}.example.com/{key}".to_string(),
            }),
            RetryPolicy::default(),
            DateFormatter::for_locale("en-US"),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_card_per_record() {
        let view = Arc::new(MemoryView::new());
        let fetcher = Arc::new(KeyFetcher::new(&["a.jpg", "b.jpg", "c.jpg"]));
        let mut renderer = renderer(view.clone(), fetcher);

        let records = vec![record("a.jpg", &[]), record("b.jpg", &[]), record("c.jpg", &[])];
        assert_eq!(renderer.render(Some(&records)), 3);

        let snapshot = view.snapshot();
        assert_eq!(snapshot.cards.len(), 3);
        assert!(snapshot.message.is_none());
        // Placeholders are present before any loader has run
        assert!(snapshot.cards.iter().all(|c| c.image == ImageSlot::Loading));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_or_missing_results_show_placeholder_message() {
        let view = Arc::new(MemoryView::new());
        let fetcher = Arc::new(KeyFetcher::new(&[]));
        let mut renderer = renderer(view.clone(), fetcher);

        assert_eq!(renderer.render(Some(&[])), 0);
        assert_eq!(renderer.render(None), 0);

        let snapshot = view.snapshot();
        assert!(snapshot.cards.is_empty());
        assert_eq!(snapshot.message.as_deref(), Some("No images found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_text_shows_labels_and_date() {
        let view = Arc::new(MemoryView::new());
        let fetcher = Arc::new(KeyFetcher::new(&["cat.jpg"]));
        let mut renderer = renderer(view.clone(), fetcher);

        renderer.render(Some(&[record("cat.jpg", &["cat", "sunset"])]));

        let card = &view.snapshot().cards[0];
        assert_eq!(card.card.labels, "cat, sunset");
        assert_eq!(card.card.image_url, "https://album.example.com/cat.jpg");
        // Date only, no time of day
        assert!(!card.card.created.contains(':'));
        assert!(card.card.created.ends_with("/2023"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_card_does_not_hold_back_others() {
        let view = Arc::new(MemoryView::new());
        let fetcher = Arc::new(KeyFetcher::new(&["good.jpg"]));
        let mut renderer = renderer(view.clone(), fetcher);

        renderer.render(Some(&[record("bad.jpg", &[]), record("good.jpg", &[])]));
        tokio::time::sleep(Duration::from_millis(10)).await;

        // The good card is loaded while the bad one is still backing off
        let snapshot = view.snapshot();
        assert_eq!(snapshot.cards[0].image, ImageSlot::Loading);
        assert!(matches!(snapshot.cards[1].image, ImageSlot::Loaded { .. }));

        let statuses = renderer.settle().await;
        assert_eq!(statuses, vec![LoadStatus::Failed, LoadStatus::Loaded]);
        assert_eq!(view.snapshot().cards[0].image, ImageSlot::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerender_cancels_previous_loaders() {
        let view = Arc::new(MemoryView::new());
        let fetcher = Arc::new(KeyFetcher::new(&["new.jpg"]));
        let mut renderer = renderer(view.clone(), fetcher.clone());

        renderer.render(Some(&[record("old.jpg", &[])]));
        tokio::time::sleep(Duration::from_millis(10)).await;
        renderer.render(Some(&[record("new.jpg", &[])]));
        let statuses = renderer.settle().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(statuses, vec![LoadStatus::Loaded]);
        let old_fetches = fetcher
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains("old.jpg"))
            .count();
        assert_eq!(old_fetches, 1);

        let snapshot = view.snapshot();
        assert_eq!(snapshot.cards.len(), 1);
        assert_eq!(snapshot.cards[0].card.object_key, "new.jpg");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerender_after_abandoned_settle_cancels_loaders() {
        let view = Arc::new(MemoryView::new());
        let fetcher = Arc::new(KeyFetcher::new(&["new.jpg"]));
        let mut renderer = renderer(view.clone(), fetcher.clone());

        renderer.render(Some(&[record("old.jpg", &[])]));
        let waited = tokio::time::timeout(Duration::from_millis(500), renderer.settle()).await;
        assert!(waited.is_err());

        renderer.render(Some(&[record("new.jpg", &[])]));
        tokio::time::sleep(Duration::from_secs(30)).await;

        let old_fetches = fetcher
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.contains("old.jpg"))
            .count();
        assert_eq!(old_fetches, 1);
        assert_eq!(renderer.settle().await, vec![LoadStatus::Loaded]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_replaces_cards() {
        let view = Arc::new(MemoryView::new());
        let fetcher = Arc::new(KeyFetcher::new(&["a.jpg"]));
        let mut renderer = renderer(view.clone(), fetcher);

        renderer.render(Some(&[record("a.jpg", &[])]));
        renderer.show_error("Error searching photos");

        let snapshot = view.snapshot();
        assert!(snapshot.cards.is_empty());
        assert_eq!(snapshot.message.as_deref(), Some("Error searching photos"));
        assert!(renderer.loaders.is_empty());
    }
}
