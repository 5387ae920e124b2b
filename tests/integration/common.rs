//! Shared fixtures: a mock MediaWiki instance and test configurations

use serde_json::{json, Value};
use std::io::Cursor;
use std::path::Path;
use wiki_mirror::config::{parse_config, Config};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches requests whose query string lacks `name`
pub struct MissingQueryParam(pub &'static str);

impl Match for MissingQueryParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(key, _)| key == self.0)
    }
}

/// Builds a validated configuration pointing at `server`, writing into `output_dir`
pub fn test_config(server: &MockServer, output_dir: &Path) -> Config {
    parse_config(&format!(
        r#"
username = "Mirror@bot"
password = "hunter2"

[wiki]
base-url = "{}/"

[output]
directory = '{}'
preserve = ["README.md"]

[thresholds]
min-processed-pages = 2
max-suppressed-exceptions = 1
"#,
        server.uri(),
        output_dir.display()
    ))
    .expect("test config is valid")
}

/// Mounts the two-step login flow; the login response sets a session cookie
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("meta", "tokens"))
        .and(query_param("type", "login"))
        .respond_with(json_response(json!({
            "batchcomplete": true,
            "query": {"tokens": {"logintoken": "abc123+\\"}}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api.php"))
        .and(body_string_contains("action=login"))
        .and(body_string_contains("lgname=Mirror%40bot"))
        .respond_with(
            json_response(json!({"login": {"result": "Success", "lgusername": "Mirror"}}))
                .insert_header("set-cookie", "wikidb_session=s3ss10n; Path=/; HttpOnly"),
        )
        .mount(server)
        .await;
}

/// Mounts an `allpages` listing for one redirect filter
///
/// With two batches, the first response carries a continuation token and the
/// second is only served for requests that echo it back.
pub async fn mount_listing(server: &MockServer, filter: &str, batches: &[Value]) {
    match batches {
        [only] => {
            Mock::given(method("GET"))
                .and(path("/api.php"))
                .and(query_param("list", "allpages"))
                .and(query_param("apfilterredir", filter))
                .respond_with(json_response(json!({"query": {"allpages": only}})))
                .mount(server)
                .await;
        }
        [first, second] => {
            Mock::given(method("GET"))
                .and(path("/api.php"))
                .and(query_param("list", "allpages"))
                .and(query_param("apfilterredir", filter))
                .and(MissingQueryParam("apcontinue"))
                .respond_with(json_response(json!({
                    "continue": {"apcontinue": "Next_Batch", "continue": "-||"},
                    "query": {"allpages": first}
                })))
                .mount(server)
                .await;

            Mock::given(method("GET"))
                .and(path("/api.php"))
                .and(query_param("list", "allpages"))
                .and(query_param("apfilterredir", filter))
                .and(query_param("apcontinue", "Next_Batch"))
                .respond_with(json_response(json!({"query": {"allpages": second}})))
                .mount(server)
                .await;
        }
        _ => panic!("mount_listing supports one or two batches"),
    }
}

/// Mounts `prop=info` for one page
pub async fn mount_page_info(server: &MockServer, page_id: i64, title: &str) {
    let url_title = title.replace(' ', "_");
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("prop", "info"))
        .and(query_param("pageids", page_id.to_string()))
        .respond_with(json_response(json!({
            "query": {"pages": [{
                "pageid": page_id,
                "ns": 0,
                "title": title,
                "contentmodel": "wikitext",
                "pagelanguage": "en",
                "touched": "2025-03-01T12:30:00Z",
                "lastrevid": 1000 + page_id,
                "length": 512,
                "fullurl": format!("{}/{}", server.uri(), url_title),
                "canonicalurl": format!("{}/{}", server.uri(), url_title),
                "displaytitle": title
            }]}
        })))
        .mount(server)
        .await;
}

/// Mounts `prop=links` for a redirect page
pub async fn mount_redirect_links(server: &MockServer, page_id: i64, title: &str, target: &str) {
    Mock::given(method("GET"))
        .and(path("/api.php"))
        .and(query_param("prop", "links"))
        .and(query_param("pageids", page_id.to_string()))
        .respond_with(json_response(json!({
            "query": {"pages": [{
                "pageid": page_id,
                "ns": 0,
                "title": title,
                "links": [{"ns": 0, "title": target}]
            }]}
        })))
        .mount(server)
        .await;
}

/// Mounts the rendered body of a page
pub async fn mount_rendered(server: &MockServer, page_id: i64, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/index.php"))
        .and(query_param("action", "render"))
        .and(query_param("curid", page_id.to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

pub fn json_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

pub fn html_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

/// Encodes a PNG of the given size
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    });
    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .expect("PNG encodes");
    buffer.into_inner()
}
