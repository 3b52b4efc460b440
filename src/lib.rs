//! # Bing Image Dataset
//!
//! A thin client for the Bing image, video and visual search APIs, plus a
//! bulk exporter that turns image search results into a labeled dataset on
//! disk or inside a zip archive.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Request and response records (SearchQuery, SearchResultPage, etc.)
//! - [`client`]: The search client and the traits the exporter depends on
//! - [`export`]: Dataset export to disk or zip
//! - [`utils`]: Shared HTTP client
//! - [`config`]: Configuration management

pub mod client;
pub mod config;
pub mod export;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use client::{BingSearchClient, SearchError};
pub use export::{DatasetExporter, ExportError};
pub use models::{SafeSearchMode, TermLabelPair};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
