//! Mock search and fetch implementations for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{ContentFetcher, ImageSearch, SearchError};
use crate::models::{ImageResult, ImageSearchPage, SearchQuery};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Image search that returns predefined pages per term and records every query.
#[derive(Debug, Default)]
pub struct MockImageSearch {
    pages: Mutex<HashMap<String, ImageSearchPage>>,
    pages_at: Mutex<HashMap<(String, u32), ImageSearchPage>>,
    failures: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<SearchQuery>>,
}

impl MockImageSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `page` for every query on `term`, whatever the offset.
    pub fn set_page(&self, term: impl Into<String>, page: ImageSearchPage) {
        lock(&self.pages).insert(term.into(), page);
    }

    /// Return `page` for queries on `term` at exactly `offset`; takes
    /// precedence over [`set_page`](Self::set_page).
    pub fn set_page_at(&self, term: impl Into<String>, offset: u32, page: ImageSearchPage) {
        lock(&self.pages_at).insert((term.into(), offset), page);
    }

    /// Shorthand for a page of results pointing at `urls`.
    pub fn set_urls(&self, term: impl Into<String>, urls: &[&str]) {
        let items = urls.iter().map(|url| ImageResult::with_content_url(*url)).collect();
        self.set_page(term, ImageSearchPage::new(items));
    }

    /// Fail every query on `term` with a protocol error.
    pub fn fail_term(&self, term: impl Into<String>, message: impl Into<String>) {
        lock(&self.failures).insert(term.into(), message.into());
    }

    /// Queries received so far, in order.
    pub fn calls(&self) -> Vec<SearchQuery> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl ImageSearch for MockImageSearch {
    async fn search_images(&self, query: &SearchQuery) -> Result<ImageSearchPage, SearchError> {
        lock(&self.calls).push(query.clone());

        if let Some(message) = lock(&self.failures).get(&query.term) {
            return Err(SearchError::Protocol(message.clone()));
        }

        let at_offset = lock(&self.pages_at)
            .get(&(query.term.clone(), query.offset))
            .cloned();
        let mut page = at_offset
            .or_else(|| lock(&self.pages).get(&query.term).cloned())
            .unwrap_or_else(|| ImageSearchPage::new(Vec::new()));
        page.items.truncate(query.count as usize);
        Ok(page)
    }
}

/// Content fetcher that serves predefined bodies per URL and counts requests.
///
/// URLs without a configured body fail with a transport error.
#[derive(Debug, Default)]
pub struct MockFetcher {
    bodies: Mutex<HashMap<String, Result<Vec<u8>, String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn set_body(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        lock(&self.bodies).insert(url.into(), Ok(body.into()));
    }

    /// Fail requests for `url` with a transport error.
    pub fn fail(&self, url: impl Into<String>, message: impl Into<String>) {
        lock(&self.bodies).insert(url.into(), Err(message.into()));
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SearchError> {
        lock(&self.calls).push(url.to_string());

        match lock(&self.bodies).get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(message)) => Err(SearchError::Transport(message.clone())),
            None => Err(SearchError::Transport(format!("no route to {}", url))),
        }
    }
}
