//! Core data models for search requests, results and dataset exports.

mod export;
mod insights;
mod search;

pub use export::{ExportSummary, TermLabelPair};
pub use insights::{CropArea, Filters, ImageInfo, InsightsOptions, InsightsRequest, KnowledgeRequest};
pub use search::{
    ImageResult, ImageSearchPage, Publisher, SafeSearchMode, SearchQuery, SearchResultPage,
    VideoResult, VideoSearchPage,
};
