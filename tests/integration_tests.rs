//! Integration tests for Bing Image Dataset
//!
//! These tests run the search client and the exporter against a local mock
//! HTTP server standing in for both the search API and the image hosts.

use bing_image_dataset::client::{
    BingSearchClient, ContentFetcher, SearchError, SUBSCRIPTION_KEY_HEADER,
};
use bing_image_dataset::config::SearchConfig;
use bing_image_dataset::export::{DatasetExporter, ExportError};
use bing_image_dataset::models::{InsightsOptions, SafeSearchMode, SearchQuery, TermLabelPair};
use bing_image_dataset::utils::HttpClient;
use mockito::{Matcher, Server, ServerGuard};
use std::io::Read;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const KEY: &str = "test-key";

fn client_for(server: &ServerGuard) -> BingSearchClient {
    let config = SearchConfig::new(server.url(), KEY).log_requests(true);
    BingSearchClient::from_config(&config).unwrap()
}

fn exporter_for(client: BingSearchClient) -> DatasetExporter {
    let fetcher = Arc::new(client.http().clone());
    DatasetExporter::new(Arc::new(client), fetcher)
}

fn image_page(urls: &[String]) -> String {
    let items: Vec<serde_json::Value> = urls
        .iter()
        .map(|url| serde_json::json!({ "name": "image", "contentUrl": url }))
        .collect();
    serde_json::json!({
        "_type": "Images",
        "totalEstimatedMatches": urls.len(),
        "value": items,
    })
    .to_string()
}

#[tokio::test]
async fn test_search_images_sends_query_and_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "tabby cat".into()),
            Matcher::UrlEncoded("count".into(), "20".into()),
            Matcher::UrlEncoded("offset".into(), "40".into()),
            Matcher::UrlEncoded("mkt".into(), "en-US".into()),
            Matcher::UrlEncoded("safeSearch".into(), "Strict".into()),
        ]))
        .match_header(SUBSCRIPTION_KEY_HEADER, KEY)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{
            "_type": "Images",
            "totalEstimatedMatches": 512,
            "nextOffset": 60,
            "value": [
                {"name": "Tabby", "contentUrl": "https://img.example.com/tabby.jpg", "width": 800, "height": 600}
            ]
        }"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let query = SearchQuery::new("tabby cat")
        .safe_search(SafeSearchMode::Strict)
        .count(20)
        .offset(40);
    let page = client.search_images(&query).await.unwrap();

    mock.assert_async().await;
    assert_eq!(page.total_estimated_matches, 512);
    assert_eq!(page.next_offset, Some(60));
    assert_eq!(page.len(), 1);
    assert_eq!(
        page.items[0].content_url.as_deref(),
        Some("https://img.example.com/tabby.jpg")
    );
}

#[tokio::test]
async fn test_search_page_never_exceeds_requested_count() {
    let mut server = Server::new_async().await;
    let urls: Vec<String> = (0..5).map(|i| format!("https://img.example.com/{}.jpg", i)).collect();
    server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(image_page(&urls))
        .create_async()
        .await;

    let page = client_for(&server)
        .search_images(&SearchQuery::new("cats").count(2))
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
}

#[tokio::test]
async fn test_search_videos() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/bing/v7.0/videos/search")
        .match_query(Matcher::UrlEncoded("q".into(), ".NET".into()))
        .match_header(SUBSCRIPTION_KEY_HEADER, KEY)
        .with_status(200)
        .with_body(r#"{
            "_type": "Videos",
            "totalEstimatedMatches": 90,
            "value": [{"name": "Intro to .NET", "contentUrl": "https://video.example.com/1", "duration": "PT12M"}]
        }"#)
        .create_async()
        .await;

    let page = client_for(&server)
        .search_videos(&SearchQuery::new(".NET").count(20))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.total_estimated_matches, 90);
    assert_eq!(page.items[0].name.as_deref(), Some("Intro to .NET"));
    assert_eq!(page.items[0].duration.as_deref(), Some("PT12M"));
}

#[tokio::test]
async fn test_search_error_carries_reason_and_body() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .search_images(&SearchQuery::new("cats"))
        .await
        .unwrap_err();

    match err {
        SearchError::Protocol(message) => {
            assert!(message.contains("Unauthorized"), "{}", message);
            assert!(message.contains("invalid subscription key"), "{}", message);
        }
        other => panic!("expected protocol error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_protocol_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = client_for(&server)
        .search_images(&SearchQuery::new("cats"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Protocol(_)));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let config = SearchConfig::new("http://127.0.0.1:1", KEY);
    let client = BingSearchClient::from_config(&config).unwrap();

    let err = client
        .search_images(&SearchQuery::new("cats"))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Transport(_)));
}

#[tokio::test]
async fn test_image_insights_upload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/bing/v7.0/images/visualsearch")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("mkt".into(), "en-US".into()),
            Matcher::UrlEncoded("safeSearch".into(), "Off".into()),
        ]))
        .match_header(SUBSCRIPTION_KEY_HEADER, KEY)
        .match_header("X-BingApis-SDK", "true")
        .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="knowledgeRequest""#.into()),
            Matcher::Regex(r#""site":"www.example.com""#.into()),
            Matcher::Regex(r#"filename="cat.jpg""#.into()),
        ]))
        .with_status(200)
        .with_body(r#"{"_type": "ImageKnowledge", "tags": []}"#)
        .create_async()
        .await;

    let options = InsightsOptions::new().site("www.example.com");
    let body = client_for(&server)
        .get_image_insights(b"fake-jpeg".to_vec(), "cat.jpg", SafeSearchMode::Off, &options)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(body.contains("ImageKnowledge"));
}

#[tokio::test]
async fn test_image_insights_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/bing/v7.0/images/visualsearch")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body("Image too large")
        .create_async()
        .await;

    let err = client_for(&server)
        .get_image_insights(b"x".to_vec(), "big.jpg", SafeSearchMode::Moderate, &InsightsOptions::new())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("Bad Request"), "{}", message);
    assert!(message.contains("Image too large"), "{}", message);
}

#[tokio::test]
async fn test_fetch_with_caller_supplied_client() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/img/a.jpg")
        .match_header("user-agent", "dataset-tests")
        .with_status(200)
        .with_body("a-bytes")
        .create_async()
        .await;
    server
        .mock("GET", "/img/gone.jpg")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let client = reqwest::Client::builder()
        .user_agent("dataset-tests")
        .build()
        .unwrap();
    let http = HttpClient::from_client(Arc::new(client));

    let body = http.fetch(&format!("{}/img/a.jpg", server.url())).await.unwrap();
    mock.assert_async().await;
    assert_eq!(body, b"a-bytes");

    let err = http
        .fetch(&format!("{}/img/gone.jpg", server.url()))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not here"), "{}", err);
}

#[tokio::test]
async fn test_disk_export_end_to_end() {
    let mut server = Server::new_async().await;
    let urls = vec![
        format!("{}/img/a.jpg", server.url()),
        format!("{}/img/b.jpg", server.url()),
        format!("{}/img/c.png?size=400", server.url()),
    ];

    let search = server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "cats".into()),
            Matcher::UrlEncoded("count".into(), "150".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(image_page(&urls))
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/img/a.jpg")
        .with_status(200)
        .with_body("a-bytes")
        .create_async()
        .await;
    server
        .mock("GET", "/img/b.jpg")
        .with_status(403)
        .with_body("Forbidden")
        .create_async()
        .await;
    server
        .mock("GET", "/img/c.png")
        .match_query(Matcher::UrlEncoded("size".into(), "400".into()))
        .with_status(200)
        .with_body("c-bytes")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let summary = exporter_for(client_for(&server))
        .export_to_disk(
            &[TermLabelPair::new("cats")],
            dir.path(),
            SafeSearchMode::Moderate,
            false,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    search.assert_async().await;
    assert_eq!(summary.stored, 2);
    assert_eq!(summary.failed, 1);

    let folder = dir.path().join("Images").join("cats");
    assert_eq!(std::fs::read_to_string(folder.join("a.jpg")).unwrap(), "a-bytes");
    assert_eq!(std::fs::read_to_string(folder.join("c.png")).unwrap(), "c-bytes");
    assert!(!folder.join("b.jpg").exists());
}

#[tokio::test]
async fn test_disk_export_aborts_on_search_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("quota exceeded")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let err = exporter_for(client_for(&server))
        .export_to_disk(
            &[TermLabelPair::new("cats")],
            dir.path(),
            SafeSearchMode::Moderate,
            false,
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Search(SearchError::Protocol(_))));
    assert!(!dir.path().join("Images").exists());
}

#[tokio::test]
async fn test_zip_export_end_to_end() {
    let mut server = Server::new_async().await;
    let urls = vec![
        format!("{}/img/a.jpg", server.url()),
        format!("{}/img/missing.jpg", server.url()),
    ];

    let first_page = server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "golden retriever".into()),
            Matcher::UrlEncoded("offset".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(image_page(&urls))
        .expect(1)
        .create_async()
        .await;
    // No estimate and no items: the results ran out
    let second_page = server
        .mock("GET", "/bing/v7.0/images/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "golden retriever".into()),
            Matcher::UrlEncoded("offset".into(), "150".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"_type": "Images", "value": []}"#)
        .expect(1)
        .create_async()
        .await;
    server
        .mock("GET", "/img/a.jpg")
        .with_status(200)
        .with_body("a-bytes")
        .create_async()
        .await;
    server
        .mock("GET", "/img/missing.jpg")
        .with_status(404)
        .create_async()
        .await;

    let cursor = exporter_for(client_for(&server))
        .export_to_zip(
            &[TermLabelPair::new("golden retriever").label("dog")],
            SafeSearchMode::Strict,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(cursor.position(), 0);
    first_page.assert_async().await;
    second_page.assert_async().await;

    let mut archive = zip::ZipArchive::new(cursor).unwrap();
    assert_eq!(archive.len(), 1);

    let mut entry = archive.by_index(0).unwrap();
    assert_eq!(entry.name(), "Images/dog/a.jpg");
    let mut body = String::new();
    entry.read_to_string(&mut body).unwrap();
    assert_eq!(body, "a-bytes");
}
