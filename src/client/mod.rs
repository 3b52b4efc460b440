//! Search service client and the seams the exporter depends on.
//!
//! [`BingSearchClient`] talks to the Bing v7 REST surface: image search,
//! video search and visual search ("insights") uploads. Each operation is
//! one outbound request; nothing is retried and no state is shared between
//! calls beyond the pooled HTTP connection.
//!
//! The exporter does not depend on the concrete client. It sees two async
//! traits instead:
//!
//! - [`ImageSearch`]: one page of image results for a [`SearchQuery`]
//! - [`ContentFetcher`]: the raw bytes behind a content URL
//!
//! [`MockImageSearch`] and [`MockFetcher`] implement both for tests.

mod bing;
pub mod mock;

pub use bing::{
    BingSearchClient, IMAGE_SEARCH_PATH, SUBSCRIPTION_KEY_HEADER, VIDEO_SEARCH_PATH,
    VISUAL_SEARCH_PATH,
};
pub use mock::{MockFetcher, MockImageSearch};

use crate::models::{ImageSearchPage, SearchQuery};
use async_trait::async_trait;

/// Something that can return one page of image results
#[async_trait]
pub trait ImageSearch: Send + Sync + std::fmt::Debug {
    async fn search_images(&self, query: &SearchQuery) -> Result<ImageSearchPage, SearchError>;
}

/// Something that can download the bytes behind a URL
#[async_trait]
pub trait ContentFetcher: Send + Sync + std::fmt::Debug {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SearchError>;
}

/// Errors that can occur when talking to the search service or a content host
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Missing or invalid endpoint/credential
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The remote end could not be reached
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-success status or a body that does not decode
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SearchError::Protocol(err.to_string())
        } else {
            SearchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Protocol(format!("JSON: {}", err))
    }
}

/// Turn a non-success response into a `Protocol` error carrying both the
/// reason phrase and the body text
pub(crate) async fn error_from_response(response: reqwest::Response) -> SearchError {
    let status = response.status();
    let reason = status.canonical_reason().unwrap_or("Unknown");
    let details = response.text().await.unwrap_or_default();
    SearchError::Protocol(format!(
        "Reason: {} ({}). Details: {}",
        reason,
        status.as_u16(),
        details
    ))
}
