//! Search command
//!
//! Runs a search and renders its results, reporting failures as a single
//! status message. Responses that arrive after a newer one has been
//! rendered are dropped unless the stale-response guard is turned off.

use tokio::sync::Mutex;

use crate::config::messages;
use crate::render::{LoadStatus, ResultRenderer};
use crate::search::SearchClient;
use crate::{log_error, log_info, log_warn};

const MODULE: &str = "commands::search";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results rendered; number of cards
    Rendered(usize),
    /// Request failed; the failure message is shown
    Failed,
    /// A newer search was already rendered; nothing changed
    Stale,
}

struct PageState {
    renderer: ResultRenderer,
    last_rendered: u64,
}

pub struct SearchPage {
    client: SearchClient,
    state: Mutex<PageState>,
    discard_stale: bool,
}

impl SearchPage {
    pub fn new(client: SearchClient, renderer: ResultRenderer, discard_stale: bool) -> Self {
        Self {
            client,
            state: Mutex::new(PageState {
                renderer,
                last_rendered: 0,
            }),
            discard_stale,
        }
    }

    /// Search for `query` and show the outcome
    pub async fn submit(&self, query: &str) -> SearchOutcome {
        let tagged = self.client.search_tagged(query).await;
        let mut state = self.state.lock().await;

        if self.discard_stale && tagged.sequence < state.last_rendered {
            log_warn!(
                MODULE,
                "Dropping response #{} for {:?}; #{} is already shown",
                tagged.sequence,
                query,
                state.last_rendered
            );
            return SearchOutcome::Stale;
        }
        state.last_rendered = tagged.sequence;

        match tagged.result {
            Ok(records) => {
                let count = state.renderer.render(Some(&records));
                log_info!(MODULE, "Showing {} results for {:?}", count, query);
                SearchOutcome::Rendered(count)
            }
            Err(e) => {
                log_error!(MODULE, "Error searching photos: {}", e);
                state.renderer.show_error(messages::SEARCH_FAILED);
                SearchOutcome::Failed
            }
        }
    }

    /// Wait until every image on the page has loaded, failed or been
    /// replaced by a newer search. The page stays unlocked while waiting.
    pub async fn settle(&self) -> Vec<LoadStatus> {
        let pending = self.state.lock().await.renderer.settle();
        pending.await
    }
}
