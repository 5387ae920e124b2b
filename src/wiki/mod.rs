//! Wiki module: the facade over the source MediaWiki instance
//!
//! Everything the mirror learns about the wiki goes through [`WikiClient`]:
//! page enumeration, metadata and link lookups, rendered bodies and raw assets.

mod client;
mod types;

pub use client::{build_http_client, WikiClient};
pub use types::{LinkTarget, PageInfo, PageLinks, PageListing};
