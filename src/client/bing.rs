//! Bing Search v7 client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::fmt;
use url::Url;

use super::{error_from_response, ImageSearch, SearchError};
use crate::config::SearchConfig;
use crate::models::{
    ImageSearchPage, InsightsOptions, InsightsRequest, SafeSearchMode, SearchQuery,
    SearchResultPage, VideoSearchPage,
};
use crate::utils::HttpClient;

pub const IMAGE_SEARCH_PATH: &str = "/bing/v7.0/images/search";
pub const VIDEO_SEARCH_PATH: &str = "/bing/v7.0/videos/search";
pub const VISUAL_SEARCH_PATH: &str = "/bing/v7.0/images/visualsearch";

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const SDK_HEADER: &str = "X-BingApis-SDK";

/// Client for the Bing image, video and visual search APIs
///
/// All settings come from the [`SearchConfig`] given at construction time.
#[derive(Clone)]
pub struct BingSearchClient {
    http: HttpClient,
    endpoint: String,
    subscription_key: String,
    market: String,
    log_requests: bool,
}

impl fmt::Debug for BingSearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BingSearchClient")
            .field("http", &self.http)
            .field("endpoint", &self.endpoint)
            .field("subscription_key", &"<redacted>")
            .field("market", &self.market)
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

impl BingSearchClient {
    /// Create a client, rejecting a missing endpoint or key up front
    pub fn new(config: &SearchConfig, http: HttpClient) -> Result<Self, SearchError> {
        let endpoint = config.endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(SearchError::Configuration(
                "search endpoint is not set".to_string(),
            ));
        }

        match Url::parse(endpoint) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(SearchError::Configuration(format!(
                    "search endpoint is not an http(s) URL: {}",
                    endpoint
                )))
            }
        }

        if config.subscription_key.trim().is_empty() {
            return Err(SearchError::Configuration(
                "subscription key is not set".to_string(),
            ));
        }

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            subscription_key: config.subscription_key.trim().to_string(),
            market: config.market.clone(),
            log_requests: config.log_requests,
        })
    }

    /// Create a client with its own default HTTP client
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::new(config, HttpClient::new()?)
    }

    /// The HTTP client, shared with anything that downloads content
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Search for images
    pub async fn search_images(&self, query: &SearchQuery) -> Result<ImageSearchPage, SearchError> {
        self.get_page(IMAGE_SEARCH_PATH, query).await
    }

    /// Search for videos
    pub async fn search_videos(&self, query: &SearchQuery) -> Result<VideoSearchPage, SearchError> {
        self.get_page(VIDEO_SEARCH_PATH, query).await
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &SearchQuery,
    ) -> Result<SearchResultPage<T>, SearchError> {
        if !query.is_valid() {
            return Err(SearchError::InvalidRequest(
                "search term must not be empty".to_string(),
            ));
        }

        let url = self.build_url(path);
        if self.log_requests {
            tracing::debug!(
                url = %url,
                term = %query.term,
                count = query.count,
                offset = query.offset,
                safe_search = %query.safe_search,
                "Sending search request"
            );
        }

        let params = [
            ("q", query.term.clone()),
            ("count", query.count.to_string()),
            ("offset", query.offset.to_string()),
            ("mkt", self.market.clone()),
            ("safeSearch", query.safe_search.to_string()),
        ];

        let response = self
            .http
            .client()
            .get(&url)
            .query(&params)
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .send()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to read search response: {}", e)))?;

        let mut page: SearchResultPage<T> = serde_json::from_str(&body).map_err(|e| {
            SearchError::Protocol(format!("Failed to parse search response: {}", e))
        })?;
        page.items.truncate(query.count as usize);

        Ok(page)
    }

    /// Upload an image to visual search and return the raw JSON response
    pub async fn get_image_insights(
        &self,
        image: Vec<u8>,
        filename: &str,
        safe_search: SafeSearchMode,
        options: &InsightsOptions,
    ) -> Result<String, SearchError> {
        if image.is_empty() && options.image_url.is_none() {
            return Err(SearchError::InvalidRequest(
                "either image bytes or an image URL is required".to_string(),
            ));
        }

        let knowledge_request = serde_json::to_string(&InsightsRequest::from(options))?;
        let mut form = Form::new().text("knowledgeRequest", knowledge_request);
        if !image.is_empty() {
            form = form.part("image", Part::bytes(image).file_name(filename.to_string()));
        }

        let url = self.build_url(VISUAL_SEARCH_PATH);
        if self.log_requests {
            tracing::debug!(url = %url, filename, safe_search = %safe_search, "Sending insights request");
        }

        let response = self
            .http
            .client()
            .post(&url)
            .query(&[("mkt", self.market.as_str()), ("safeSearch", safe_search.as_str())])
            .header(SUBSCRIPTION_KEY_HEADER, &self.subscription_key)
            .header(SDK_HEADER, "true")
            .multipart(form)
            .send()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to reach {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .text()
            .await
            .map_err(|e| SearchError::Transport(format!("Failed to read insights response: {}", e)))
    }
}

#[async_trait]
impl ImageSearch for BingSearchClient {
    async fn search_images(&self, query: &SearchQuery) -> Result<ImageSearchPage, SearchError> {
        BingSearchClient::search_images(self, query).await
    }
}
