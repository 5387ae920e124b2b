//! Records returned by the MediaWiki action API (`formatversion=2`)

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry of a `list=allpages` enumeration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageListing {
    #[serde(rename = "pageid")]
    pub page_id: i64,

    #[serde(rename = "ns")]
    pub namespace: i64,

    pub title: String,
}

/// Page metadata from `prop=info&inprop=url|displaytitle`
#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "pageid")]
    pub page_id: i64,

    pub title: String,

    /// Display title; may contain inline HTML
    #[serde(rename = "displaytitle", default)]
    pub display_title: Option<String>,

    #[serde(rename = "contentmodel", default)]
    pub content_model: String,

    #[serde(rename = "pagelanguage", default)]
    pub language: String,

    /// Last time the page or anything it transcludes changed
    #[serde(rename = "touched", default)]
    pub touched: Option<DateTime<Utc>>,

    #[serde(rename = "lastrevid", default)]
    pub last_revision_id: i64,

    #[serde(default)]
    pub length: u64,

    #[serde(rename = "fullurl", default)]
    pub full_url: String,

    #[serde(rename = "editurl", default)]
    pub edit_url: String,

    #[serde(rename = "canonicalurl", default)]
    pub canonical_url: String,
}

impl PageInfo {
    /// The display title, falling back to the plain title
    pub fn heading(&self) -> &str {
        self.display_title
            .as_deref()
            .filter(|title| !title.trim().is_empty())
            .unwrap_or(&self.title)
    }
}

/// Outbound links of a page from `prop=links`
#[derive(Debug, Clone, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "pageid")]
    pub page_id: i64,

    pub title: String,

    #[serde(default)]
    pub links: Vec<LinkTarget>,
}

/// A single link target
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkTarget {
    #[serde(rename = "ns")]
    pub namespace: i64,

    pub title: String,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TokenQueryResponse {
    #[serde(default)]
    pub query: TokenQueryPayload,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TokenQueryPayload {
    pub tokens: Option<TokenPayload>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TokenPayload {
    pub logintoken: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub login: LoginPayload,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct LoginPayload {
    pub result: Option<String>,
    pub reason: Option<String>,
}
