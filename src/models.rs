use serde::{Deserialize, Serialize};

/// One row of a rates table: the price of one unit of `base` in `currency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub base: String,
    pub currency: String,
    pub rate: f64,
}

/// Every rate quoted against one base currency, as returned by a single fetch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrencyQuoteSet {
    pub base_key: String,
    pub as_of_date: Option<String>,
    pub rates: Vec<ExchangeRate>,
}

impl CurrencyQuoteSet {
    pub fn empty(base_key: &str) -> Self {
        Self {
            base_key: base_key.to_string(),
            as_of_date: None,
            rates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyCatalogEntry {
    pub key: String,
    pub display_name: String,
}

impl CurrencyCatalogEntry {
    /// Name to show for this entry; blank names fall back to the uppercased code.
    pub fn label(&self) -> String {
        if self.display_name.trim().is_empty() {
            self.key.to_uppercase()
        } else {
            self.display_name.clone()
        }
    }
}
