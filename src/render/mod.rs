//! Render module: turns a server-rendered wiki page into a static document
//!
//! # Pipeline
//!
//! 1. Render the outer template around the page body
//! 2. Parse the document
//! 3. Remove comments, empty paragraphs and flagged empty elements
//! 4. Normalize headings
//! 5. Rewrite links, then images
//! 6. Serialize
//!
//! Parsing and mutation happen synchronously inside [`render_page`]; the parsed
//! tree never lives across an `.await`.

mod stylesheet;
mod template;
mod transform;

pub use stylesheet::{fetch_stylesheet, sanitize_stylesheet};
pub use template::{protect_url, render_template, restore_url, PageTemplate, PLACEHOLDER_PREFIX};
pub use transform::{
    normalize_headings, remove_comments, remove_empty_paragraphs, remove_flagged_empty,
    rewrite_images, rewrite_links, PAGE_TITLE_ID,
};

use crate::output::output_path;
use crate::url::{normalize_title, to_normalized_path, LinkRewriter};
use crate::wiki::PageInfo;
use crate::Result;
use chrono::{DateTime, Utc};
use scraper::Html;
use std::path::{Path, PathBuf};
use url::Url;

/// Site-root path of the mirrored stylesheet
pub const STYLESHEET_PATH: &str = "/style.css";

/// Site-root path of the mirrored favicon
pub const FAVICON_PATH: &str = "/favicon.ico";

/// A finished page, ready to be written
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Normalized site-root output path, e.g. `/Command/setuphead.html`
    pub path: String,
    pub html: String,
    /// Original `src` of every local image the page references
    pub images: Vec<String>,
}

/// Renders one page of the mirror
///
/// # Arguments
///
/// * `body` - Server-rendered HTML body of the page
/// * `info` - Page metadata
/// * `rewriter` - Link rewriter holding the frozen redirect table
/// * `mirrored_at` - Timestamp of this mirror run
pub fn render_page(
    body: &str,
    info: &PageInfo,
    rewriter: &LinkRewriter,
    mirrored_at: DateTime<Utc>,
) -> Result<RenderedPage> {
    let path = to_normalized_path(&normalize_title(&info.title));

    let canonical_url = if info.canonical_url.is_empty() {
        rewriter.base_url().to_string()
    } else {
        info.canonical_url.clone()
    };

    let language = if info.language.is_empty() {
        "en"
    } else {
        info.language.as_str()
    };

    let page = PageTemplate {
        title: &info.title,
        heading: info.heading(),
        language,
        modified: info.touched,
        mirrored: mirrored_at,
        style_href: rewriter.make_url_relative(STYLESHEET_PATH, &path),
        favicon_href: rewriter.make_url_relative(FAVICON_PATH, &path),
        home_href: rewriter.make_url_relative("/", &path),
        canonical_url: protect_url(&canonical_url),
        revision_url: protect_url(revision_url(rewriter.base_url(), info)?.as_str()),
        body,
    };

    let mut document = Html::parse_document(&render_template(&page));

    remove_comments(&mut document);
    remove_empty_paragraphs(&mut document);
    remove_flagged_empty(&mut document);
    normalize_headings(&mut document);
    rewrite_links(&mut document, rewriter, &path);
    let images = rewrite_images(&mut document, rewriter, &path);

    Ok(RenderedPage {
        path,
        html: document.html(),
        images,
    })
}

/// Builds the URL of the diff between the mirrored revision and the current one
pub fn revision_url(base_url: &str, info: &PageInfo) -> Result<Url> {
    let mut url = Url::parse(base_url)?.join("index.php")?;
    url.query_pairs_mut()
        .append_pair("title", &info.title.replace(' ', "_"))
        .append_pair("diff", "cur")
        .append_pair("oldid", &info.last_revision_id.to_string());
    Ok(url)
}

/// Writes `page` below `output_dir`, creating parent directories
pub async fn write_page(output_dir: &Path, page: &RenderedPage) -> Result<PathBuf> {
    let target = output_path(output_dir, &page.path);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, page.html.as_bytes()).await?;
    Ok(target)
}
