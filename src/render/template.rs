//! Outer page template
//!
//! Absolute links back to the live wiki (canonical URL, revision diff) are
//! rendered under a placeholder scheme so the link rewriter leaves them alone;
//! the rewriter restores the real scheme when it meets them.

use chrono::{DateTime, Utc};
use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Prefix that turns `https://…` into the placeholder scheme `x-mirror-https://…`
pub const PLACEHOLDER_PREFIX: &str = "x-mirror-";

/// Wraps an absolute URL in the placeholder scheme
pub fn protect_url(url: &str) -> String {
    if url.contains("://") {
        format!("{}{}", PLACEHOLDER_PREFIX, url)
    } else {
        url.to_string()
    }
}

/// Restores a placeholder-scheme URL, or returns `None` for any other href
pub fn restore_url(href: &str) -> Option<&str> {
    href.strip_prefix(PLACEHOLDER_PREFIX)
}

/// Variables of the outer page template
#[derive(Debug, Clone)]
pub struct PageTemplate<'a> {
    /// Plain page title for `<title>`
    pub title: &'a str,
    /// Display title; trusted HTML from the wiki
    pub heading: &'a str,
    pub language: &'a str,
    pub modified: Option<DateTime<Utc>>,
    pub mirrored: DateTime<Utc>,
    pub style_href: String,
    pub favicon_href: String,
    pub home_href: String,
    /// Canonical wiki URL, already protected
    pub canonical_url: String,
    /// Diff between the mirrored revision and the current one, already protected
    pub revision_url: String,
    /// Server-rendered page body; trusted HTML from the wiki
    pub body: &'a str,
}

/// Renders the complete page document
pub fn render_template(page: &PageTemplate<'_>) -> String {
    base_document(page).into_string()
}

fn base_document(page: &PageTemplate<'_>) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(page.language) {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (page.title) }
                link rel="stylesheet" href=(page.style_href);
                link rel="icon" href=(page.favicon_href);
                link rel="canonical" href=(page.canonical_url);
            }
            body {
                header.mirror-header {
                    a.mirror-home href=(page.home_href) { "Home" }
                }
                main.mirror-content {
                    h1 id="page-title" { (PreEscaped(page.heading)) }
                    (PreEscaped(page.body))
                }
                (footer(page))
            }
        }
    }
}

fn footer(page: &PageTemplate<'_>) -> Markup {
    html! {
        footer.mirror-footer {
            p {
                "This is a static mirror of "
                a href=(page.canonical_url) { (page.title) }
                "."
            }
            p {
                @if let Some(modified) = page.modified {
                    "Last modified "
                    time datetime=(modified.to_rfc3339()) { (modified.format("%Y-%m-%d").to_string()) }
                    ". "
                }
                "Mirrored "
                time datetime=(page.mirrored.to_rfc3339()) { (page.mirrored.format("%Y-%m-%d").to_string()) }
                ". "
                a href=(page.revision_url) { "Changes since this copy" }
            }
        }
    }
}
