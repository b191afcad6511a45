//! Per-view list state.
//!
//! Tracks what one list view is showing (search text, filters, page,
//! display mode) and which request is allowed to update it. Every fetch
//! takes a [`Ticket`] carrying a sequence number; only the most recently
//! issued ticket may apply its result, so a slow earlier response can
//! never overwrite a fresher one.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use super::service::{ListingError, ListingService};
use super::types::{ListQuery, ListResult};
use crate::render::DisplayMode;

/// What a view is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewStatus {
    /// Nothing requested yet.
    Idle,
    /// A request is in flight.
    Loading,
    /// The latest request succeeded. May hold zero rows.
    Loaded(ListResult),
    /// The latest request failed.
    Failed(String),
}

impl ViewStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewStatus::Loading)
    }
}

/// Permission to apply one request's outcome.
#[derive(Debug, Clone)]
pub struct Ticket {
    seq: u64,
    /// Snapshot of the query the request was issued for.
    pub query: ListQuery,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Result of offering an outcome to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome is now visible.
    Applied,
    /// A newer request was issued; the outcome was discarded.
    Stale,
}

struct ViewState {
    query: ListQuery,
    mode: DisplayMode,
    status: ViewStatus,
    /// Last status that was not `Loading`, restored when a request is
    /// abandoned.
    settled: ViewStatus,
}

/// State for one list view.
pub struct ListView {
    listing_id: String,
    state: Mutex<ViewState>,
    issued: AtomicU64,
}

impl ListView {
    pub fn new(listing_id: &str) -> Self {
        Self::with_query(listing_id, ListQuery::new())
    }

    /// Start from an existing query (e.g., parsed from a URL).
    pub fn with_query(listing_id: &str, query: ListQuery) -> Self {
        let query = ListQuery {
            page: query.normalized_page(),
            ..query
        };
        Self {
            listing_id: listing_id.to_string(),
            state: Mutex::new(ViewState {
                query,
                mode: DisplayMode::default(),
                status: ViewStatus::Idle,
                settled: ViewStatus::Idle,
            }),
            issued: AtomicU64::new(0),
        }
    }

    pub fn listing_id(&self) -> &str {
        &self.listing_id
    }

    pub fn query(&self) -> ListQuery {
        self.state.lock().query.clone()
    }

    pub fn status(&self) -> ViewStatus {
        self.state.lock().status.clone()
    }

    pub fn mode(&self) -> DisplayMode {
        self.state.lock().mode
    }

    /// Switch grid/list layout. Does not affect the query.
    pub fn set_mode(&self, mode: DisplayMode) {
        self.state.lock().mode = mode;
    }

    /// Change the search text. Returns whether it changed; a change resets
    /// the page to 1.
    pub fn set_search(&self, term: &str) -> bool {
        let mut state = self.state.lock();
        if state.query.search == term {
            return false;
        }
        state.query.search = term.to_string();
        state.query.page = 1;
        true
    }

    /// Change one filter value. Returns whether it changed; a change resets
    /// the page to 1.
    pub fn set_filter(&self, key: &str, value: &str) -> bool {
        let mut state = self.state.lock();
        if state.query.filters.get(key).map(String::as_str) == Some(value) {
            return false;
        }
        state.query.filters.insert(key.to_string(), value.to_string());
        state.query.page = 1;
        true
    }

    /// Remove a filter. Returns whether one was set; removal resets the
    /// page to 1.
    pub fn clear_filter(&self, key: &str) -> bool {
        let mut state = self.state.lock();
        if state.query.filters.remove(key).is_none() {
            return false;
        }
        state.query.page = 1;
        true
    }

    /// Move to a page. Page 0 is treated as page 1.
    pub fn set_page(&self, page: u32) {
        self.state.lock().query.page = page.max(1);
    }

    /// Issue a ticket for the current query and mark the view loading.
    ///
    /// The view stays `Loading` until the ticket is passed to
    /// [`complete`](Self::complete) or [`abandon`](Self::abandon), or a newer
    /// ticket settles. [`refresh`](Self::refresh) does this even when its
    /// future is dropped.
    pub fn begin(&self) -> Ticket {
        let mut state = self.state.lock();
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = std::mem::replace(&mut state.status, ViewStatus::Loading);
        if !previous.is_loading() {
            state.settled = previous;
        }
        Ticket {
            seq,
            query: state.query.clone(),
        }
    }

    /// Offer an outcome. It is applied only if its ticket is the most
    /// recently issued one. Every ticket from [`begin`](Self::begin) must end
    /// here or in [`abandon`](Self::abandon).
    pub fn complete(
        &self,
        ticket: &Ticket,
        outcome: Result<ListResult, ListingError>,
    ) -> Completion {
        let mut state = self.state.lock();
        let latest = self.issued.load(Ordering::SeqCst);
        if ticket.seq != latest {
            debug!(
                listing = %self.listing_id,
                seq = ticket.seq,
                latest,
                "discarding stale listing response"
            );
            return Completion::Stale;
        }

        state.status = match outcome {
            Ok(result) => ViewStatus::Loaded(result),
            Err(e) => ViewStatus::Failed(e.to_string()),
        };
        state.settled = state.status.clone();
        Completion::Applied
    }

    /// Give up on a request without an outcome. If it was the latest one,
    /// the view returns to what it showed before the request began.
    pub fn abandon(&self, ticket: &Ticket) {
        self.abandon_seq(ticket.seq);
    }

    fn abandon_seq(&self, seq: u64) {
        let mut state = self.state.lock();
        if seq != self.issued.load(Ordering::SeqCst) || !state.status.is_loading() {
            return;
        }
        debug!(listing = %self.listing_id, seq, "listing request abandoned");
        state.status = state.settled.clone();
    }

    /// Fetch the current query through the service and apply the result.
    pub async fn refresh(&self, service: &ListingService) -> Completion {
        let ticket = self.begin();
        let mut pending = Pending {
            view: self,
            seq: Some(ticket.seq),
        };
        let outcome = service.list(&self.listing_id, &ticket.query).await;
        pending.seq = None;
        self.complete(&ticket, outcome)
    }
}

/// Abandons an in-flight ticket if `refresh` is dropped before completing.
struct Pending<'a> {
    view: &'a ListView,
    seq: Option<u64>,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if let Some(seq) = self.seq.take() {
            self.view.abandon_seq(seq);
        }
    }
}
