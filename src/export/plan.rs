//! Paging plan for a dataset export.

use crate::models::ImageSearchPage;

/// Results wanted per term before clamping
pub const TOTAL_ITEMS_TO_RETRIEVE: u32 = 1000;

/// Page size requested from the service
pub const ITEMS_PER_PAGE: u32 = 150;

/// Items taken from each page by a disk export
pub const DISK_ITEMS_PER_PAGE: usize = 10;

/// How many pages to request per term and how much of each page to keep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePlan {
    pub total_items: u32,
    pub page_size: u32,

    /// Upper bound on the computed page count
    pub max_pages: Option<u32>,

    /// Items processed from the front of each page
    pub items_per_page: Option<usize>,
}

impl PagePlan {
    /// Disk exports fetch only the first page and keep its first 10 items.
    pub fn disk() -> Self {
        Self {
            total_items: TOTAL_ITEMS_TO_RETRIEVE,
            page_size: ITEMS_PER_PAGE,
            max_pages: Some(1),
            items_per_page: Some(DISK_ITEMS_PER_PAGE),
        }
    }

    /// Zip exports walk every computed page and keep whole pages.
    ///
    /// `totalEstimatedMatches` is not consulted; only an empty page ends the
    /// walk before the seventh request.
    pub fn zip() -> Self {
        Self {
            total_items: TOTAL_ITEMS_TO_RETRIEVE,
            page_size: ITEMS_PER_PAGE,
            max_pages: None,
            items_per_page: None,
        }
    }

    /// Clamp the page count, e.g. `Some(1)` for a single request per term
    pub fn max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn items_per_page(mut self, items: Option<usize>) -> Self {
        self.items_per_page = items;
        self
    }

    /// `ceil(total_items / page_size)`, clamped by `max_pages`
    pub fn page_count(&self) -> u32 {
        if self.page_size == 0 {
            return 0;
        }

        let pages = self.total_items.div_ceil(self.page_size);
        match self.max_pages {
            Some(max) => pages.min(max),
            None => pages,
        }
    }

    pub fn offset(&self, page_index: u32) -> u32 {
        page_index.saturating_mul(self.page_size)
    }

    pub fn item_limit(&self) -> usize {
        self.items_per_page.unwrap_or(usize::MAX)
    }

    /// An empty page means the results ran out; stop requesting more
    pub fn is_last_page(&self, page: &ImageSearchPage) -> bool {
        page.is_empty()
    }
}
