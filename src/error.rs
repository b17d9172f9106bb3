use reqwest::StatusCode;
use thiserror::Error;

/// Failures while retrieving or reading a document from the rates API.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request limit exceeded")]
    RateLimited,

    #[error("{url} returned status {status}")]
    Status { url: String, status: StatusCode },

    #[error("malformed document from {url}: {reason}")]
    Malformed { url: String, reason: String },
}
