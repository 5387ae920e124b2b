//! Wiki client facade against a mock MediaWiki API

use crate::common::{
    html_response, json_response, mount_listing, mount_login, mount_rendered, test_config,
};
use futures::TryStreamExt;
use serde_json::json;
use wiki_mirror::wiki::PageListing;
use wiki_mirror::{MirrorError, WikiClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_login_establishes_session() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_login(&server).await;

    let config = test_config(&server, dir.path());
    let client = WikiClient::new(&config).unwrap();

    client.login(&config.username, &config.password).await.unwrap();
}

#[tokio::test]
async fn test_login_rejected() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("meta", "tokens"))
        .respond_with(json_response(json!({"query": {"tokens": {"logintoken": "t+\\"}}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api.php"))
        .respond_with(json_response(json!({
            "login": {"result": "Failed", "reason": "Incorrect username or password entered."}
        })))
        .mount(&server)
        .await;

    let config = test_config(&server, dir.path());
    let client = WikiClient::new(&config).unwrap();
    let error = client
        .login(&config.username, &config.password)
        .await
        .unwrap_err();

    match error {
        MirrorError::Authentication(reason) => assert!(reason.contains("Incorrect")),
        other => panic!("expected an authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_without_session_cookie_fails() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("meta", "tokens"))
        .respond_with(json_response(json!({"query": {"tokens": {"logintoken": "t+\\"}}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api.php"))
        .respond_with(json_response(json!({"login": {"result": "Success"}})))
        .mount(&server)
        .await;

    let config = test_config(&server, dir.path());
    let client = WikiClient::new(&config).unwrap();
    let error = client
        .login(&config.username, &config.password)
        .await
        .unwrap_err();

    assert!(matches!(error, MirrorError::Authentication(_)));
}

#[tokio::test]
async fn test_listing_follows_continuation() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_listing(
        &server,
        "nonredirects",
        &[
            json!([
                {"pageid": 1, "ns": 0, "title": "Main Page"},
                {"pageid": 2, "ns": 0, "title": "Page A"}
            ]),
            json!([{"pageid": 3, "ns": 0, "title": "Page B"}]),
        ],
    )
    .await;

    let client = WikiClient::new(&test_config(&server, dir.path())).unwrap();
    let pages: Vec<PageListing> = client
        .list_pages(0, false)
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let titles: Vec<&str> = pages.iter().map(|page| page.title.as_str()).collect();
    assert_eq!(titles, vec!["Main Page", "Page A", "Page B"]);
}

#[tokio::test]
async fn test_api_calls_assert_user() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("prop", "info"))
        .and(query_param("assertuser", "Mirror"))
        .and(query_param("formatversion", "2"))
        .respond_with(json_response(json!({
            "query": {"pages": [{"pageid": 7, "title": "Asserted"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WikiClient::new(&test_config(&server, dir.path())).unwrap();
    let info = client.page_info(7).await.unwrap();

    assert_eq!(info.title, "Asserted");
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api.php"))
        .respond_with(json_response(json!({
            "error": {"code": "assertnameduserfailed", "info": "You are no longer logged in as \"Mirror\"."}
        })))
        .mount(&server)
        .await;

    let client = WikiClient::new(&test_config(&server, dir.path())).unwrap();
    let error = client.page_info(7).await.unwrap_err();

    match error {
        MirrorError::Api { code, .. } => assert_eq!(code, "assertnameduserfailed"),
        other => panic!("expected an API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rendered_page_uses_fixed_render_options() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("action", "render"))
        .and(query_param("safemode", "1"))
        .and(query_param("uselang", "en"))
        .and(query_param("curid", "5"))
        .respond_with(html_response("<p>Rendered</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = WikiClient::new(&test_config(&server, dir.path())).unwrap();

    assert_eq!(client.get_rendered_page(5).await.unwrap(), "<p>Rendered</p>");
}

#[tokio::test]
async fn test_server_error_is_an_http_error() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    mount_rendered(&server, 9, ResponseTemplate::new(500)).await;

    let client = WikiClient::new(&test_config(&server, dir.path())).unwrap();
    let error = client.get_rendered_page(9).await.unwrap_err();

    assert!(matches!(error, MirrorError::Http { .. }));
}

#[tokio::test]
async fn test_raw_get_returns_bytes() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 0, 1, 0]))
        .mount(&server)
        .await;

    let client = WikiClient::new(&test_config(&server, dir.path())).unwrap();

    assert_eq!(client.raw_get("/favicon.ico", &[]).await.unwrap(), vec![0, 0, 1, 0]);
}
