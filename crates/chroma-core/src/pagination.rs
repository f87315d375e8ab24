use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{info, warn};

use chroma_types::api::RecordPage;
use chroma_types::models::{Collection, OrderBy};

use crate::error::CoreError;
use crate::source::RecordSource;
use crate::view::{FetchOutcome, Ticket, ViewModel, ViewState};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Inclusive `(from, to)` positions of a zero-based page.
pub fn page_range(page: usize, page_size: usize) -> (usize, usize) {
    let page_size = page_size.max(1);
    let from = page.saturating_mul(page_size);
    (from, from.saturating_add(page_size - 1))
}

/// Read one page of `collection`, newest first.
pub async fn load_page(
    source: &dyn RecordSource,
    collection: Collection,
    page: usize,
    page_size: usize,
) -> Result<RecordPage, CoreError> {
    let page_size = page_size.max(1);
    let (from, to) = page_range(page, page_size);

    let records = source
        .list_records_range(collection, OrderBy::NEWEST_FIRST, from, to)
        .await
        .map_err(|source| CoreError::FetchFailed { page, source })?;

    Ok(RecordPage::from_slice(page, page_size, records))
}

/// Pages through a single collection. Every page change re-reads the source;
/// nothing is cached. A failed read leaves the displayed page in place and a
/// response that arrives after a newer request is discarded.
///
/// Navigation is relative to the most recently *requested* page, so presses
/// made while a page is still loading accumulate.
pub struct PaginatedFetcher {
    source: Arc<dyn RecordSource>,
    collection: Collection,
    page_size: usize,
    view: ViewModel<RecordPage>,
    requested: Mutex<usize>,
}

impl PaginatedFetcher {
    pub fn new(source: Arc<dyn RecordSource>, collection: Collection, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            source,
            collection,
            page_size,
            view: ViewModel::new(RecordPage::empty(page_size)),
            requested: Mutex::new(0),
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<RecordPage>> {
        self.view.subscribe()
    }

    pub fn snapshot(&self) -> ViewState<RecordPage> {
        self.view.snapshot()
    }

    /// Index of the page currently displayed.
    pub fn current_page(&self) -> usize {
        self.view.snapshot().data.page
    }

    /// Index of the page most recently asked for. Equals `current_page` once
    /// that request has settled.
    pub fn requested_page(&self) -> usize {
        *self.requested.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn go_to(&self, page: usize) -> Result<FetchOutcome<RecordPage>, CoreError> {
        match self.request(|_| Some(page)) {
            Some((page, ticket)) => self.load(page, ticket).await,
            None => Ok(FetchOutcome::Unchanged),
        }
    }

    pub async fn reload(&self) -> Result<FetchOutcome<RecordPage>, CoreError> {
        match self.request(Some) {
            Some((page, ticket)) => self.load(page, ticket).await,
            None => Ok(FetchOutcome::Unchanged),
        }
    }

    /// Advance one page if the displayed page was full.
    pub async fn next(&self) -> Result<FetchOutcome<RecordPage>, CoreError> {
        let has_next = self.view.snapshot().data.has_next;
        let target = self.request(|requested| {
            if has_next {
                requested.checked_add(1)
            } else {
                None
            }
        });
        match target {
            Some((page, ticket)) => self.load(page, ticket).await,
            None => Ok(FetchOutcome::Unchanged),
        }
    }

    pub async fn previous(&self) -> Result<FetchOutcome<RecordPage>, CoreError> {
        match self.request(|requested| requested.checked_sub(1)) {
            Some((page, ticket)) => self.load(page, ticket).await,
            None => Ok(FetchOutcome::Unchanged),
        }
    }

    /// Pick the target from the last requested page and issue its ticket
    /// under one lock, so concurrent navigation never reuses a target.
    fn request(&self, target: impl FnOnce(usize) -> Option<usize>) -> Option<(usize, Ticket)> {
        let mut requested = self.requested.lock().unwrap_or_else(PoisonError::into_inner);
        let page = target(*requested)?;
        *requested = page;
        Some((page, self.view.begin()))
    }

    async fn load(&self, page: usize, ticket: Ticket) -> Result<FetchOutcome<RecordPage>, CoreError> {
        let result = load_page(self.source.as_ref(), self.collection, page, self.page_size).await;

        match &result {
            Ok(loaded) => info!(
                "Loaded {} page {} ({} records)",
                self.collection,
                page,
                loaded.records.len()
            ),
            Err(e) => warn!("Error fetching {} page {}: {}", self.collection, page, e),
        }

        let outcome = self.view.settle(ticket, result);
        if outcome.is_err() {
            // The latest request failed: navigation resumes from what is shown
            let mut requested = self.requested.lock().unwrap_or_else(PoisonError::into_inner);
            if self.view.is_current(ticket) {
                *requested = self.view.snapshot().data.page;
            }
        }
        outcome
    }
}
