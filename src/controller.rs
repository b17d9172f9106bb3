//! State of one rates view: which currency is shown, the loaded quote set,
//! the loading state machine and the interactive table state.
//!
//! Fetches are split in two halves so the caller decides how they run:
//! [`TableViewController::trigger_fetch`] hands out a [`FetchTicket`] and
//! [`TableViewController::complete`] applies its result. Only the result of
//! the most recently issued ticket is ever applied.

use crate::api::RatesSource;
use crate::error::FetchError;
use crate::models::CurrencyQuoteSet;
use crate::table::{self, ColumnId, PageView, ViewState};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: RequestId,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

pub struct TableViewController {
    code: String,
    quotes: CurrencyQuoteSet,
    view: ViewState,
    page_size: usize,
    state: LoadState,
    latest_request: u64,
    mounted: bool,
}

impl TableViewController {
    pub fn new(code: &str, page_size: usize) -> Self {
        Self {
            code: code.to_string(),
            quotes: CurrencyQuoteSet::empty(code),
            view: ViewState::default(),
            page_size,
            state: LoadState::Idle,
            latest_request: 0,
            mounted: true,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    pub fn quotes(&self) -> &CurrencyQuoteSet {
        &self.quotes
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn page(&self) -> PageView<'_> {
        table::derive_page(&self.quotes.rates, &self.view, self.page_size)
    }

    pub fn page_count(&self) -> usize {
        let filtered = table::filter_and_sort(&self.quotes.rates, &self.view).len();
        table::page_count(filtered, self.page_size)
    }

    /// Marks the view as loading and issues a ticket for the current code.
    /// Any ticket issued earlier becomes stale.
    pub fn trigger_fetch(&mut self) -> FetchTicket {
        self.latest_request += 1;
        self.state = LoadState::Loading;
        debug!(code = %self.code, request = self.latest_request, "fetch issued");

        FetchTicket {
            id: RequestId(self.latest_request),
            code: self.code.clone(),
        }
    }

    /// Switches to another base currency with a fresh view.
    pub fn navigate(&mut self, code: &str) -> FetchTicket {
        self.code = code.to_string();
        self.quotes = CurrencyQuoteSet::empty(code);
        self.view.reset();
        self.trigger_fetch()
    }

    /// Resets filter, sort and page, then fetches the current code again.
    pub fn refresh(&mut self) -> FetchTicket {
        self.view.reset();
        self.trigger_fetch()
    }

    /// Applies a fetch result. Returns false, leaving state untouched, when
    /// the ticket is no longer the latest or the view was unmounted.
    pub fn complete(
        &mut self,
        id: RequestId,
        result: Result<CurrencyQuoteSet, FetchError>,
    ) -> bool {
        if !self.mounted || id.0 != self.latest_request {
            debug!(
                request = id.0,
                latest = self.latest_request,
                "discarding stale response"
            );
            return false;
        }

        match result {
            Ok(quotes) => {
                info!(code = %self.code, rows = quotes.rates.len(), "rates loaded");
                self.quotes = quotes;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(code = %self.code, "could not load rates: {}", e);
                self.quotes = CurrencyQuoteSet::empty(&self.code);
                self.state = LoadState::Failed(e.to_string());
            }
        }
        self.view.first_page();
        true
    }

    /// Stops accepting results; anything still in flight is ignored.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn set_filter_text(&mut self, text: &str) {
        self.view.set_filter_text(text);
    }

    pub fn toggle_sort(&mut self, column: ColumnId) -> bool {
        self.view.toggle_sort(column)
    }

    pub fn next_page(&mut self) {
        let page_count = self.page_count();
        self.view.next_page(page_count);
    }

    pub fn previous_page(&mut self) {
        self.view.previous_page();
    }

    /// Shows the zero-based `page`, or the last page when it is out of range.
    pub fn go_to_page(&mut self, page: usize) {
        let page_count = self.page_count();
        self.view.go_to_page(page, page_count);
    }

    /// Fetches the current code and applies the result in one step.
    pub async fn load(&mut self, source: &dyn RatesSource, min_display: Duration) -> bool {
        let ticket = self.trigger_fetch();
        let (id, result) = run_fetch(source, ticket, min_display).await;
        self.complete(id, result)
    }
}

/// Runs the fetch for `ticket`, settling no sooner than `min_display` after
/// it started.
pub async fn run_fetch(
    source: &dyn RatesSource,
    ticket: FetchTicket,
    min_display: Duration,
) -> (RequestId, Result<CurrencyQuoteSet, FetchError>) {
    let (result, _) = tokio::join!(
        source.fetch_rates(&ticket.code),
        tokio::time::sleep(min_display)
    );
    (ticket.id, result)
}
