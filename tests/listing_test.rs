//! Integration tests for the blog listing and the fetch controller.

use std::sync::Arc;
use std::time::Duration;

use catalog_site::api::{ApiError, ContentClient};
use catalog_site::blog::{BlogListingLoader, ListingKey};
use catalog_site::routing::ImagePattern;
use catalog_site::view::{FetchController, ViewState};
use serde_json::json;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn listing_body() -> serde_json::Value {
    json!({
        "blogs": [
            { "_id": "1", "slug": "sap", "title": "SAP", "category": "SAP", "status": "Trending" },
            { "_id": "2", "slug": "hr", "title": "HR", "category": "HR", "status": "Recommended" },
            { "_id": "3", "slug": "ds", "title": "Data", "category": "Data Science" }
        ],
        "hasMore": true
    })
}

fn controller(base_url: Option<String>) -> FetchController<BlogListingLoader> {
    let client = ContentClient::new(reqwest::Client::new(), base_url);
    FetchController::new(BlogListingLoader::new(client))
}

#[tokio::test]
async fn test_listing_groups_cards() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .mount(&server)
        .await;

    let state = controller(Some(server.uri())).load(ListingKey::All).await;
    let listing = state.ready().expect("listing should be ready");

    assert_eq!(listing.cards.len(), 3);
    assert_eq!(listing.trending.len(), 1);
    assert_eq!(listing.recommended.len(), 1);
    assert_eq!(listing.categories, vec!["SAP", "HR", "Data Science"]);
    assert!(listing.has_more);
    assert_eq!(listing.in_category("HR").len(), 1);
    assert_eq!(listing.in_category("all").len(), 3);
}

#[tokio::test]
async fn test_retry_after_backend_recovers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .mount(&server)
        .await;

    let controller = controller(Some(server.uri()));

    let state = controller.load(ListingKey::All).await;
    assert_eq!(
        state,
        ViewState::Error {
            message: "Failed to load blogs. Please try again later.".to_string(),
            retryable: true,
        }
    );

    let state = controller.retry().await;
    assert!(state.is_ready());
    assert_eq!(controller.state(), state);
}

#[tokio::test]
async fn test_missing_base_url_fails_without_network() {
    // Every request this client makes would land on the proxy.
    let proxy = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .expect(0)
        .mount(&proxy)
        .await;
    let http = reqwest::Client::builder()
        .proxy(reqwest::Proxy::all(proxy.uri()).unwrap())
        .build()
        .unwrap();

    let controller = FetchController::new(BlogListingLoader::new(ContentClient::new(http, None)));
    let state = controller.load(ListingKey::All).await;
    assert_eq!(
        state,
        ViewState::Error {
            message: "API URL is not configured.".to_string(),
            retryable: false,
        }
    );

    assert_eq!(controller.retry().await, state);

    let client = ContentClient::new(reqwest::Client::new(), None);
    assert!(matches!(
        client.list_blogs().await,
        Err(ApiError::NotConfigured { .. })
    ));
    assert!(proxy.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_images_outside_allowlist_are_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blogs": [
                { "_id": "1", "title": "Kept", "category": "SAP", "image": "https://i.imgur.com/kept.png" },
                { "_id": "2", "title": "Dropped", "category": "SAP", "image": "https://evil.example.com/x.png" },
                { "_id": "3", "title": "Local", "category": "SAP", "image": "/uploads/local.png" }
            ]
        })))
        .mount(&server)
        .await;

    let state = controller(Some(server.uri())).load(ListingKey::All).await;
    let listing = state.ready().expect("listing should be ready");
    let images: Vec<Option<&str>> = listing.cards.iter().map(|c| c.image_url.as_deref()).collect();
    let local = format!("{}/uploads/local.png", server.uri());
    assert_eq!(
        images,
        vec![Some("https://i.imgur.com/kept.png"), None, Some(local.as_str())]
    );

    // A routes file can allow other hosts instead.
    let loader = BlogListingLoader::new(ContentClient::new(reqwest::Client::new(), Some(server.uri())))
        .with_image_patterns(vec![ImagePattern {
            protocol: "https".to_string(),
            hostname: "evil.example.com".to_string(),
        }]);
    let state = FetchController::new(loader).load(ListingKey::All).await;
    let listing = state.ready().expect("listing should be ready");
    assert_eq!(listing.cards[0].image_url, None);
    assert_eq!(
        listing.cards[1].image_url.as_deref(),
        Some("https://evil.example.com/x.png")
    );
}

#[tokio::test]
async fn test_invalid_record_fails_whole_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blogs": [
                { "_id": "1", "title": "Fine", "category": "SAP" },
                { "_id": "2", "category": "SAP" }
            ]
        })))
        .mount(&server)
        .await;

    let state = controller(Some(server.uri())).load(ListingKey::All).await;
    assert!(state.is_retryable());
}

#[tokio::test]
async fn test_category_listing_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .and(query_param("category", "Data Science"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "blogs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let state = controller(Some(server.uri()))
        .load(ListingKey::Category("Data Science".to_string()))
        .await;
    let listing = state.ready().expect("listing should be ready");
    assert!(listing.is_empty());
    assert!(!listing.has_more);
}

#[tokio::test]
async fn test_stale_result_never_overwrites_newer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .and(query_param("category", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "blogs": [
                    { "_id": "old", "title": "Old", "category": "slow" }
                ]}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .and(query_param("category", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "blogs": [
            { "_id": "new", "title": "New", "category": "fast" }
        ]})))
        .mount(&server)
        .await;

    let controller = Arc::new(controller(Some(server.uri())));

    let slow = {
        let controller = controller.clone();
        tokio::spawn(async move {
            controller
                .load(ListingKey::Category("slow".to_string()))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller
        .load(ListingKey::Category("fast".to_string()))
        .await;
    slow.await.unwrap();

    let state = controller.state();
    let listing = state.ready().expect("listing should be ready");
    assert_eq!(listing.cards[0].id, "new");
    assert_eq!(controller.generation(), 2);
}

#[tokio::test]
async fn test_teardown_drops_pending_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(listing_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let controller = Arc::new(controller(Some(server.uri())));
    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.load(ListingKey::All).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.teardown();

    let state = pending.await.unwrap();
    assert!(state.is_loading());
    assert!(controller.state().is_loading());
}
