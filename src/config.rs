use std::{env, time::Duration};

pub const DEFAULT_API_URL: &str = "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1";
pub const API_URL_VAR: &str = "API_URL";

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const SKELETON_ROWS: usize = 10;

// keeps the skeleton from flashing
static LOADING_MIN_DISPLAY: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub page_size: usize,
    pub min_loading: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            min_loading: LOADING_MIN_DISPLAY,
        }
    }
}

impl Config {
    /// Defaults, with the API base taken from `API_URL` when it is set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var(API_URL_VAR) {
            config = config.with_api_url(&url);
        }
        config
    }

    pub fn with_api_url(mut self, url: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.api_url = trimmed.to_string();
        }
        self
    }
}
