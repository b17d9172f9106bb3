pub mod api;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod error;
pub mod loading;
pub mod models;
pub mod render;
pub mod session;
pub mod table;

pub use api::{HttpRatesSource, RatesSource};
pub use controller::{LoadState, TableViewController};
pub use error::FetchError;
pub use models::{CurrencyCatalogEntry, CurrencyQuoteSet, ExchangeRate};
