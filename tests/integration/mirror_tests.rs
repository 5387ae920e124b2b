//! End-to-end mirror runs against a mock wiki

use crate::common::{
    html_response, mount_listing, mount_login, mount_page_info, mount_redirect_links,
    mount_rendered, png_bytes, test_config,
};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use wiki_mirror::url::LinkRewriter;
use wiki_mirror::{run_mirror, Coordinator, MirrorError, Verdict, WikiClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LOGO_SRC: &str = "/images/thumb/a/ab/Logo.png/1200px-Logo.png";

/// Mounts a small wiki: three good pages, one page whose render fails, one
/// redirect, a stylesheet, a favicon and one image shared by two pages
async fn mount_wiki(server: &MockServer) {
    mount_login(server).await;

    mount_listing(
        server,
        "redirects",
        &[json!([{"pageid": 10, "ns": 0, "title": "Old Page"}])],
    )
    .await;
    mount_redirect_links(server, 10, "Old Page", "Page A").await;

    mount_listing(
        server,
        "nonredirects",
        &[
            json!([
                {"pageid": 1, "ns": 0, "title": "Main Page"},
                {"pageid": 2, "ns": 0, "title": "Page A"}
            ]),
            json!([
                {"pageid": 3, "ns": 0, "title": "Command/setuphead"},
                {"pageid": 4, "ns": 0, "title": "Broken"}
            ]),
        ],
    )
    .await;

    for (page_id, title) in [
        (1, "Main Page"),
        (2, "Page A"),
        (3, "Command/setuphead"),
        (4, "Broken"),
    ] {
        mount_page_info(server, page_id, title).await;
    }

    mount_rendered(
        server,
        1,
        html_response(&format!(
            r#"<div class="mw-parser-output"><p>Welcome. See <a href="/Old_Page">the old page</a>.</p>
            <p><img src="{LOGO_SRC}" srcset="/images/a/ab/Logo.png 2x"></p><!-- cache key --></div>"#
        )),
    )
    .await;
    mount_rendered(
        server,
        2,
        html_response(&format!(
            r#"<div class="mw-parser-output"><h1>Page A</h1><p><a href="/Main_Page">Home</a></p>
            <img src="{LOGO_SRC}"></div>"#
        )),
    )
    .await;
    mount_rendered(
        server,
        3,
        html_response(
            r#"<div class="mw-parser-output"><h2>Options</h2><p><a href="/Command/setupbodyfont">font</a></p></div>"#,
        ),
    )
    .await;
    mount_rendered(server, 4, ResponseTemplate::new(500)).await;

    Mock::given(method("GET"))
        .and(path("/load.php"))
        .and(query_param("only", "styles"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/css")
                .set_body_string("/* ResourceLoader */\n@import url(https://fonts.example.org/x.css);\nbody{margin:0}"),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 0, 1, 0, 1, 0]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(LOGO_SRC))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(png_bytes(1200, 600)),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn read(root: &Path, relative: &str) -> String {
    std::fs::read_to_string(root.join(relative))
        .unwrap_or_else(|e| panic!("failed to read {relative}: {e}"))
}

#[tokio::test]
async fn test_full_mirror_run() {
    let server = MockServer::start().await;
    mount_wiki(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("README.md"), "kept").unwrap();
    std::fs::write(root.join("stale.html"), "removed").unwrap();

    let summary = run_mirror(test_config(&server, root)).await.unwrap();

    // Pages 1-3 render, page 4's render fails and is contained
    assert_eq!(summary.counters.processed_pages, 3);
    assert_eq!(summary.counters.suppressed_exceptions, 1);
    assert_eq!(summary.verdict, Verdict::Success);

    // Setup cleared the directory except preserved entries
    assert_eq!(read(root, "README.md"), "kept");
    assert!(!root.join("stale.html").exists());

    // The home page became index.html
    assert!(!root.join("Main_Page.html").exists());
    let index = read(root, "index.html");
    assert!(index.contains(r#"href="Page_A.html""#), "redirect not followed: {index}");
    assert!(index.contains(r#"src="images/thumb/a/ab/Logo.webp""#));
    assert!(!index.contains("srcset"));
    assert!(!index.contains("cache key"));

    let page_a = read(root, "Page_A.html");
    assert!(page_a.contains(r#"href="index.html""#));
    assert_eq!(page_a.matches("<h1").count(), 1);

    let setuphead = read(root, "Command/setuphead.html");
    assert!(setuphead.contains(r#"href="setupbodyfont.html""#));
    assert!(setuphead.contains(&format!(r#"href="{}/Command/setuphead""#, server.uri())));

    assert!(!root.join("Broken.html").exists());

    assert_eq!(read(root, "style.css"), "body{margin:0}");
    assert_eq!(std::fs::read(root.join("favicon.ico")).unwrap(), vec![0, 0, 1, 0, 1, 0]);

    let logo = image::open(root.join("images/thumb/a/ab/Logo.webp")).unwrap();
    assert_eq!((logo.width(), logo.height()), (1000, 500));
}

#[tokio::test]
async fn test_thresholds_decide_the_verdict() {
    let server = MockServer::start().await;
    mount_wiki(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&server, dir.path());
    config.thresholds.max_suppressed_exceptions = 0;

    let summary = run_mirror(config).await.unwrap();

    assert_eq!(summary.counters.suppressed_exceptions, 1);
    assert_eq!(summary.verdict, Verdict::Failure);
}

#[tokio::test]
async fn test_redirect_table_is_complete_before_rendering() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "redirects",
        &[
            json!([
                {"pageid": 10, "ns": 0, "title": "Old Page"},
                {"pageid": 11, "ns": 0, "title": "Start"}
            ]),
            json!([{"pageid": 12, "ns": 0, "title": "Dangling"}]),
        ],
    )
    .await;
    mount_redirect_links(&server, 10, "Old Page", "Page A").await;
    mount_redirect_links(&server, 11, "Start", "Main Page").await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("prop", "links"))
        .and(query_param("pageids", "12"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, dir.path());
    let client = WikiClient::new(&config).unwrap();
    let base_url = client.base_url().to_string();
    let coordinator = Coordinator::with_client(config, client);

    let table = coordinator.discover_redirects().await.unwrap();

    // Home page seed plus two resolved redirects; the failed one is contained
    assert_eq!(table.len(), 3);
    assert_eq!(table.resolve("Old_Page"), "Page_A");
    assert_eq!(table.resolve("Start"), "");
    assert_eq!(table.resolve("Main_Page"), "");
    assert_eq!(table.resolve("Dangling"), "Dangling");
    assert_eq!(coordinator.counters().suppressed_exceptions, 1);

    let rewriter = LinkRewriter::new(base_url, Arc::new(table));
    assert_eq!(rewriter.make_url_relative("/Start", "/X.html"), "index.html");
}

#[tokio::test]
async fn test_enumeration_failure_is_fatal() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("list", "allpages"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let result = run_mirror(test_config(&server, dir.path())).await;

    assert!(matches!(result, Err(MirrorError::Http { .. })));
}

#[tokio::test]
async fn test_failed_login_aborts_before_any_phase() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("meta", "tokens"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"query": {"tokens": {}}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("list", "allpages"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let result = run_mirror(test_config(&server, dir.path())).await;

    assert!(matches!(result, Err(MirrorError::Authentication(_))));
}
