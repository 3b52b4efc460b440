//! Utility modules.
//!
//! - [`HttpClient`]: shared reqwest client used both by the search client and
//!   as the [`ContentFetcher`](crate::client::ContentFetcher) for image downloads
//!
//! ```rust,no_run
//! use bing_image_dataset::client::ContentFetcher;
//! use bing_image_dataset::utils::HttpClient;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let bytes = client.fetch("https://example.com/cat.jpg").await?;
//! # Ok(())
//! # }
//! ```

mod http;

pub use http::HttpClient;
