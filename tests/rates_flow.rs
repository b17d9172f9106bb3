use async_trait::async_trait;
use exchange_rates::api::{parse_catalog, parse_quote_set};
use exchange_rates::controller::run_fetch;
use exchange_rates::table::ColumnId;
use exchange_rates::{
    CurrencyCatalogEntry, CurrencyQuoteSet, ExchangeRate, FetchError, LoadState, RatesSource,
    TableViewController,
};
use std::collections::HashMap;
use std::time::Duration;

/// Serves fixed documents, taking `delay` to answer for a given code.
struct StaticSource {
    documents: HashMap<String, String>,
    delays: HashMap<String, Duration>,
}

impl StaticSource {
    fn new() -> Self {
        Self {
            documents: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    fn with_document(mut self, code: &str, body: &str) -> Self {
        self.documents.insert(code.to_string(), body.to_string());
        self
    }

    fn with_delay(mut self, code: &str, delay: Duration) -> Self {
        self.delays.insert(code.to_string(), delay);
        self
    }
}

#[async_trait]
impl RatesSource for StaticSource {
    async fn fetch_rates(&self, code: &str) -> Result<CurrencyQuoteSet, FetchError> {
        if let Some(delay) = self.delays.get(code) {
            tokio::time::sleep(*delay).await;
        }

        let url = format!("memory://currencies/{}.json", code);
        match self.documents.get(code) {
            Some(body) => parse_quote_set(code, &url, body),
            None => Err(FetchError::Malformed {
                url,
                reason: "no such document".to_string(),
            }),
        }
    }

    async fn fetch_catalog(&self) -> Result<Vec<CurrencyCatalogEntry>, FetchError> {
        parse_catalog(
            "memory://currencies.json",
            r#"{ "usd": "US Dollar", "eur": "Euro" }"#,
        )
    }
}

const USD: &str = r#"{ "date": "2024-01-01", "usd": { "eur": 0.9, "jpy": 140 } }"#;
const EUR: &str = r#"{ "date": "2024-01-02", "eur": { "usd": 1.1, "gbp": 0.86, "chf": 0.94 } }"#;

#[tokio::test]
async fn usd_document_becomes_two_rows() {
    let source = StaticSource::new().with_document("usd", USD);
    let mut view = TableViewController::new("usd", 10);

    assert!(view.load(&source, Duration::ZERO).await);
    assert_eq!(view.state(), &LoadState::Loaded);

    let quotes = view.quotes();
    assert_eq!(quotes.as_of_date.as_deref(), Some("2024-01-01"));
    assert_eq!(
        quotes.rates,
        vec![
            ExchangeRate {
                base: "usd".to_string(),
                currency: "eur".to_string(),
                rate: 0.9,
            },
            ExchangeRate {
                base: "usd".to_string(),
                currency: "jpy".to_string(),
                rate: 140.0,
            },
        ]
    );
}

#[tokio::test]
async fn every_row_carries_the_requested_base() {
    let source = StaticSource::new().with_document("eur", EUR);
    let mut view = TableViewController::new("eur", 10);
    view.load(&source, Duration::ZERO).await;

    assert_eq!(view.quotes().rates.len(), 3);
    assert!(view.quotes().rates.iter().all(|r| r.base == "eur"));
}

#[tokio::test]
async fn absent_currency_is_empty_not_an_error() {
    // the eur document holds no "sek" mapping
    let source = StaticSource::new().with_document("sek", EUR);
    let mut view = TableViewController::new("sek", 10);
    view.load(&source, Duration::ZERO).await;

    assert_eq!(view.state(), &LoadState::Loaded);
    assert!(view.quotes().rates.is_empty());
    assert_eq!(view.page().page_count, 0);
}

#[tokio::test]
async fn failed_fetch_leaves_loading_state() {
    let source = StaticSource::new();
    let mut view = TableViewController::new("usd", 10);
    view.load(&source, Duration::ZERO).await;

    assert!(!view.is_loading());
    assert!(matches!(view.state(), LoadState::Failed(_)));
    assert!(view.page().rows.is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_stale_response_never_overwrites_newer_one() {
    let source = StaticSource::new()
        .with_document("usd", USD)
        .with_document("eur", EUR)
        .with_delay("usd", Duration::from_millis(500))
        .with_delay("eur", Duration::from_millis(10));
    let mut view = TableViewController::new("usd", 10);

    let slow = view.trigger_fetch();
    let fast = view.navigate("eur");

    let slow_fetch = run_fetch(&source, slow, Duration::ZERO);
    let fast_fetch = run_fetch(&source, fast, Duration::ZERO);
    tokio::pin!(slow_fetch);
    tokio::pin!(fast_fetch);

    let (id, result) = (&mut fast_fetch).await;
    assert!(view.complete(id, result));
    assert_eq!(view.quotes().base_key, "eur");

    let (id, result) = (&mut slow_fetch).await;
    assert!(!view.complete(id, result));
    assert_eq!(view.quotes().base_key, "eur");
    assert_eq!(view.quotes().as_of_date.as_deref(), Some("2024-01-02"));
}

#[tokio::test]
async fn refresh_resets_and_refetches() {
    let source = StaticSource::new().with_document("eur", EUR);
    let mut view = TableViewController::new("eur", 2);
    view.load(&source, Duration::ZERO).await;

    view.toggle_sort(ColumnId::Rate);
    view.set_filter_text("c");
    assert_eq!(view.page().rows.len(), 1);

    let ticket = view.refresh();
    assert!(view.view_state().sort().is_none());
    assert_eq!(view.view_state().filter_text(), "");

    let (id, result) = run_fetch(&source, ticket, Duration::ZERO).await;
    assert!(view.complete(id, result));
    let page = view.page();
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.page_count, 2);
    assert!(page.can_go_next);
}
