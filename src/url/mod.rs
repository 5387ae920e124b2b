//! URL handling module for Wiki-Mirror
//!
//! This module maps wiki titles and URLs to files of the static mirror:
//! title and image normalization, the redirect table, and relative-link computation.

mod normalize;
mod redirect;
mod relative;

// Re-export main functions
pub use normalize::{normalize_image_url, normalize_title, to_normalized_path};
pub use redirect::{resolve_redirect, RedirectTable, RedirectTableBuilder};
pub use relative::{is_root_relative, relativize, LinkRewriter};

pub(crate) use normalize::extension;
