//! Search request and response models.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Adult-content filtering level, passed through verbatim as `safeSearch`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SafeSearchMode {
    Strict,
    #[default]
    Moderate,
    Off,
}

impl SafeSearchMode {
    /// Textual name sent to the service
    pub fn as_str(&self) -> &'static str {
        match self {
            SafeSearchMode::Strict => "Strict",
            SafeSearchMode::Moderate => "Moderate",
            SafeSearchMode::Off => "Off",
        }
    }
}

impl fmt::Display for SafeSearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeSearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SafeSearchMode::Strict),
            "moderate" => Ok(SafeSearchMode::Moderate),
            "off" => Ok(SafeSearchMode::Off),
            other => Err(format!("unknown safe search mode: {}", other)),
        }
    }
}

/// A single paged search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search term
    pub term: String,

    /// Safe search level
    pub safe_search: SafeSearchMode,

    /// Page size
    pub count: u32,

    /// Number of results to skip
    pub offset: u32,
}

impl SearchQuery {
    /// Create a query for the first page of 10 results
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            safe_search: SafeSearchMode::default(),
            count: 10,
            offset: 0,
        }
    }

    /// Set the safe search level
    pub fn safe_search(mut self, mode: SafeSearchMode) -> Self {
        self.safe_search = mode;
        self
    }

    /// Set the page size
    pub fn count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    /// Set the offset
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Whether the term carries anything to search for
    pub fn is_valid(&self) -> bool {
        !self.term.trim().is_empty()
    }
}

/// One page of search results as returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultPage<T> {
    /// Result items in ranking order
    #[serde(rename = "value", default = "Vec::new")]
    pub items: Vec<T>,

    /// Estimated number of matches across all pages
    #[serde(default)]
    pub total_estimated_matches: u64,

    /// Offset the service suggests for the next page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u64>,
}

impl<T> SearchResultPage<T> {
    /// Create a page from items, using the item count as the estimate
    pub fn new(items: Vec<T>) -> Self {
        let total_estimated_matches = items.len() as u64;
        Self {
            items,
            total_estimated_matches,
            next_offset: None,
        }
    }

    /// Set the estimated total
    pub fn with_total(mut self, total: u64) -> Self {
        self.total_estimated_matches = total;
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Image search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    /// Direct URL of the full-size image
    #[serde(default)]
    pub content_url: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    /// Page the image was found on
    #[serde(default)]
    pub host_page_url: Option<String>,

    /// e.g. "jpeg", "png"
    #[serde(default)]
    pub encoding_format: Option<String>,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,

    /// Human-readable size, e.g. "112 KB"
    #[serde(default)]
    pub content_size: Option<String>,

    #[serde(default)]
    pub image_id: Option<String>,

    #[serde(default)]
    pub date_published: Option<String>,
}

impl ImageResult {
    /// Create a result pointing at a content URL
    pub fn with_content_url(url: impl Into<String>) -> Self {
        Self {
            content_url: Some(url.into()),
            ..Default::default()
        }
    }
}

/// Video search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResult {
    #[serde(default)]
    pub content_url: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub host_page_url: Option<String>,

    #[serde(default)]
    pub thumbnail_url: Option<String>,

    /// ISO 8601 duration, e.g. "PT4M13S"
    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default)]
    pub view_count: Option<u64>,

    #[serde(default)]
    pub publisher: Vec<Publisher>,

    #[serde(default)]
    pub date_published: Option<String>,
}

/// Publisher of a video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub name: Option<String>,
}

/// Page of image results
pub type ImageSearchPage = SearchResultPage<ImageResult>;

/// Page of video results
pub type VideoSearchPage = SearchResultPage<VideoResult>;
