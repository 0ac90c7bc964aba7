#![allow(clippy::unwrap_used)]
// Integration tests for `HttpFetcher` and `ProxyFetcher` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sitelens_api::{Error, HttpFetcher, PageFetcher, ProxyFetcher};

const PAGE: &str = r#"<html lang="en"><head><title>Hello</title></head><body><h1>Hi</h1></body></html>"#;

// ── Helpers ─────────────────────────────────────────────────────────

fn page_url(server: &MockServer, suffix: &str) -> Url {
    Url::parse(&format!("{}{suffix}", server.uri())).unwrap()
}

async fn setup_proxy() -> (MockServer, ProxyFetcher) {
    let server = MockServer::start().await;
    let proxy = page_url(&server, "/get");
    let fetcher = ProxyFetcher::with_client(reqwest::Client::new(), proxy);
    (server, fetcher)
}

// ── Direct fetch ────────────────────────────────────────────────────

#[tokio::test]
async fn test_direct_fetch_returns_markup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_client(reqwest::Client::new());
    let url = page_url(&server, "/landing");
    let body = fetcher.fetch(&url).await.unwrap();

    assert!(body.contains("<title>Hello</title>"));
}

#[tokio::test]
async fn test_direct_fetch_not_found_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_client(reqwest::Client::new());
    let result = fetcher.fetch(&page_url(&server, "/missing")).await;

    match result {
        Err(err @ Error::Status { status: 404, .. }) => {
            assert!(err.is_unreachable());
            assert_eq!(err.status(), Some(404));
        }
        other => panic!("expected Status 404, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_direct_fetch_empty_body_is_not_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::with_client(reqwest::Client::new());
    let result = fetcher.fetch(&page_url(&server, "/blank")).await;

    assert!(
        matches!(result, Err(Error::EmptyBody { .. })),
        "expected EmptyBody, got: {result:?}"
    );
}

#[tokio::test]
async fn test_direct_fetch_connection_refused_is_unreachable() {
    // Bind a server to grab a free port, then drop it.
    let server = MockServer::start().await;
    let url = page_url(&server, "/");
    drop(server);

    let fetcher = HttpFetcher::with_client(reqwest::Client::new());
    let err = fetcher.fetch(&url).await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(err.is_unreachable());
}

// ── Proxied fetch ───────────────────────────────────────────────────

#[tokio::test]
async fn test_proxy_fetch_unwraps_envelope() {
    let (server, fetcher) = setup_proxy().await;

    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("url", "https://example.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": PAGE,
            "status": { "http_code": 200 }
        })))
        .mount(&server)
        .await;

    let target = Url::parse("https://example.com").unwrap();
    let body = fetcher.fetch(&target).await.unwrap();

    assert_eq!(body, PAGE);
}

#[tokio::test]
async fn test_proxy_fetch_without_contents_is_proxy_error() {
    let (server, fetcher) = setup_proxy().await;

    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": null
        })))
        .mount(&server)
        .await;

    let target = Url::parse("https://blocked.example").unwrap();
    let result = fetcher.fetch(&target).await;

    assert!(
        matches!(result, Err(Error::Proxy { .. })),
        "expected Proxy error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_proxy_fetch_upstream_failure_is_status_error() {
    let (server, fetcher) = setup_proxy().await;

    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "contents": "<html></html>",
            "status": { "http_code": 503 }
        })))
        .mount(&server)
        .await;

    let target = Url::parse("https://down.example").unwrap();
    let result = fetcher.fetch(&target).await;

    assert!(
        matches!(result, Err(Error::Status { status: 503, .. })),
        "expected upstream 503, got: {result:?}"
    );
}

#[tokio::test]
async fn test_proxy_fetch_garbage_is_deserialization_error() {
    let (server, fetcher) = setup_proxy().await;

    Mock::given(method("GET"))
        .and(path("/get"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let target = Url::parse("https://example.com").unwrap();
    let result = fetcher.fetch(&target).await;

    match result {
        Err(Error::Deserialization { body, .. }) => assert!(body.contains("not json")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
