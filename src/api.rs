use crate::error::FetchError;
use crate::models::{CurrencyCatalogEntry, CurrencyQuoteSet, ExchangeRate};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::{Map, Value};
use tracing::debug;

/// Where rate documents and the currency catalog come from.
#[async_trait]
pub trait RatesSource: Send + Sync {
    /// Retrieves every rate quoted against `code`. A code missing from the
    /// document yields an empty set, not an error.
    async fn fetch_rates(&self, code: &str) -> Result<CurrencyQuoteSet, FetchError>;

    async fn fetch_catalog(&self) -> Result<Vec<CurrencyCatalogEntry>, FetchError>;
}

/// `RatesSource` backed by the static JSON API
/// (`/currencies.json` and `/currencies/{code}.json`).
pub struct HttpRatesSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRatesSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn catalog_url(&self) -> String {
        format!("{}/currencies.json", self.base_url)
    }

    /// The code is pushed as a single path segment, so `/` or `?` in it
    /// are escaped rather than changing the resource.
    pub fn rates_url(&self, code: &str) -> String {
        let document = format!("{}.json", code);
        let Ok(mut url) = Url::parse(&self.base_url) else {
            return format!("{}/currencies/{}", self.base_url, document);
        };

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("currencies").push(&document);
        }
        url.to_string()
    }

    async fn get_document(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "sending GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|source| FetchError::Transport {
                    url: url.to_string(),
                    source,
                }),
            StatusCode::FORBIDDEN => Err(FetchError::RateLimited),
            status => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }
}

#[async_trait]
impl RatesSource for HttpRatesSource {
    async fn fetch_rates(&self, code: &str) -> Result<CurrencyQuoteSet, FetchError> {
        let url = self.rates_url(code);
        let body = self.get_document(&url).await?;
        parse_quote_set(code, &url, &body)
    }

    async fn fetch_catalog(&self) -> Result<Vec<CurrencyCatalogEntry>, FetchError> {
        let url = self.catalog_url();
        let body = self.get_document(&url).await?;
        parse_catalog(&url, &body)
    }
}

fn parse_object(url: &str, body: &str) -> Result<Map<String, Value>, FetchError> {
    let malformed = |reason: String| FetchError::Malformed {
        url: url.to_string(),
        reason,
    };

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(malformed("expected a JSON object".to_string())),
        Err(e) => Err(malformed(e.to_string())),
    }
}

/// Reads a `/currencies/{code}.json` document. Only the sibling `date` field
/// and the mapping stored under `code` itself are consulted; rows keep the
/// document's key order.
pub fn parse_quote_set(code: &str, url: &str, body: &str) -> Result<CurrencyQuoteSet, FetchError> {
    let document = parse_object(url, body)?;

    let as_of_date = document
        .get("date")
        .and_then(Value::as_str)
        .map(str::to_string);

    let rates = match document.get(code) {
        Some(Value::Object(quotes)) => quotes
            .iter()
            .filter_map(|(currency, value)| match value.as_f64() {
                Some(rate) => Some(ExchangeRate {
                    base: code.to_string(),
                    currency: currency.clone(),
                    rate,
                }),
                None => {
                    debug!(code, currency = %currency, "skipping non-numeric rate");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    debug!(code, rows = rates.len(), "parsed rate document");
    Ok(CurrencyQuoteSet {
        base_key: code.to_string(),
        as_of_date,
        rates,
    })
}

/// Reads the flat `code -> name` catalog, preserving key order.
pub fn parse_catalog(url: &str, body: &str) -> Result<Vec<CurrencyCatalogEntry>, FetchError> {
    let document = parse_object(url, body)?;

    Ok(document
        .into_iter()
        .map(|(key, name)| CurrencyCatalogEntry {
            key,
            display_name: name.as_str().unwrap_or_default().to_string(),
        })
        .collect())
}
