//! Integration tests for the article page.

use catalog_site::api::ContentClient;
use catalog_site::blog::related::RELATED_NOTICE;
use catalog_site::blog::{ArticleKey, BlogDetailLoader};
use catalog_site::config::RelatedFailurePolicy;
use catalog_site::view::{FetchController, ViewState};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn blog(id: &str, slug: &str, category: &str) -> Value {
    json!({
        "_id": id,
        "slug": slug,
        "title": format!("Title of {slug}"),
        "category": category,
        "content": "<h2>Overview</h2><p>Body text for the article.</p>",
        "author": "Priya",
        "status": "Trending",
        "createdAt": "2024-05-01T09:30:00Z"
    })
}

fn controller(server: &MockServer, policy: RelatedFailurePolicy) -> FetchController<BlogDetailLoader> {
    let client = ContentClient::new(reqwest::Client::new(), Some(server.uri()));
    FetchController::new(BlogDetailLoader::new(client, policy))
}

async fn mount_article(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/blogs/slug/sap-basics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_matching_slug_reaches_ready_with_related() {
    let server = MockServer::start().await;
    mount_article(&server, blog("b1", "sap-basics", "SAP")).await;

    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .and(query_param("category", "SAP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blogs": [
                blog("b0", "sap-intro", "SAP"),
                blog("b1", "sap-basics", "SAP"),
                blog("b2", "sap-fico", "SAP"),
                blog("b3", "sap-mm", "SAP"),
                blog("b4", "sap-sd", "SAP"),
            ],
            "hasMore": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller(&server, RelatedFailurePolicy::Silent);
    let rx = controller.subscribe();
    assert!(rx.borrow().is_loading());

    let state = controller.load(ArticleKey::new("SAP", "sap-basics")).await;
    let page = state.ready().expect("article should be ready");

    assert_eq!(page.article.id, "b1");
    assert_eq!(page.article.title, "Title of sap-basics");
    assert_eq!(page.article.author_initial, 'P');
    assert_eq!(page.article.toc.len(), 1);

    let related: Vec<&str> = page.related.cards.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(related, vec!["b0", "b2", "b3"]);
    assert!(page.related.notice.is_none());

    assert!(rx.borrow().is_ready());
}

#[tokio::test]
async fn test_unknown_slug_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs/slug/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Blog not found"})))
        .mount(&server)
        .await;

    let controller = controller(&server, RelatedFailurePolicy::Silent);
    let state = controller.load(ArticleKey::new("SAP", "missing")).await;
    assert_eq!(state, ViewState::NotFound);
}

#[tokio::test]
async fn test_empty_object_is_not_found() {
    let server = MockServer::start().await;
    mount_article(&server, json!({})).await;

    let controller = controller(&server, RelatedFailurePolicy::Silent);
    let state = controller.load(ArticleKey::new("SAP", "sap-basics")).await;
    assert_eq!(state, ViewState::NotFound);
}

#[tokio::test]
async fn test_empty_slug_is_not_found_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let controller = controller(&server, RelatedFailurePolicy::Silent);
    let state = controller.load(ArticleKey::new("SAP", "  ")).await;
    assert_eq!(state, ViewState::NotFound);
}

#[tokio::test]
async fn test_related_failure_keeps_article_ready() {
    let server = MockServer::start().await;
    mount_article(&server, blog("b1", "sap-basics", "SAP")).await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = controller(&server, RelatedFailurePolicy::Silent);
    let state = controller.load(ArticleKey::new("SAP", "sap-basics")).await;
    let page = state.ready().expect("article should be ready");
    assert_eq!(page.article.id, "b1");
    assert!(page.related.cards.is_empty());
    assert!(page.related.notice.is_none());
}

#[tokio::test]
async fn test_related_failure_notice_policy() {
    let server = MockServer::start().await;
    mount_article(&server, blog("b1", "sap-basics", "SAP")).await;
    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let controller = controller(&server, RelatedFailurePolicy::Notice);
    let state = controller.load(ArticleKey::new("SAP", "sap-basics")).await;
    let page = state.ready().expect("article should be ready");
    assert!(page.related.cards.is_empty());
    assert_eq!(page.related.notice.as_deref(), Some(RELATED_NOTICE));
}

#[tokio::test]
async fn test_missing_category_falls_back_to_route() {
    let server = MockServer::start().await;
    let mut record = blog("b1", "sap-basics", "ignored");
    record.as_object_mut().unwrap().remove("category");
    mount_article(&server, record).await;

    Mock::given(method("GET"))
        .and(path("/api/blogs"))
        .and(query_param("category", "SAP & ERP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "blogs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller(&server, RelatedFailurePolicy::Silent);
    let state = controller.load(ArticleKey::new("SAP & ERP", "sap-basics")).await;
    let page = state.ready().expect("article should be ready");
    assert_eq!(page.article.category, "SAP & ERP");
    assert!(page.related.cards.is_empty());
}

#[tokio::test]
async fn test_server_error_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/blogs/slug/sap-basics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let controller = controller(&server, RelatedFailurePolicy::Silent);
    let state = controller.load(ArticleKey::new("SAP", "sap-basics")).await;
    assert!(state.is_retryable());
    assert!(matches!(state, ViewState::Error { ref message, .. } if !message.contains("503")));
}
