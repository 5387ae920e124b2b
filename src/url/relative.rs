use crate::url::normalize::{normalize_title, to_normalized_path};
use crate::url::redirect::RedirectTable;
use std::sync::Arc;
use ::url::Url;

/// Computes the path of `target` relative to the directory containing `from`
///
/// Both arguments are absolute site-root paths (`/A/B.html`). The walk may ascend
/// through parent directories, after which exactly one leading `../` is removed
/// from the result, so a link that has to climb out of the page's own directory
/// comes out one level short.
///
/// # Examples
///
/// ```
/// use wiki_mirror::url::relativize;
///
/// assert_eq!(relativize("/A/B.html", "/X.html"), "A/B.html");
/// assert_eq!(relativize("/A/C.html", "/A/B.html"), "C.html");
/// assert_eq!(relativize("/D.html", "/A/B.html"), "D.html");
/// ```
pub fn relativize(target: &str, from: &str) -> String {
    let target_segments: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let mut from_dir: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    from_dir.pop();

    let common = target_segments
        .iter()
        .zip(from_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_dir.len() - common];
    parts.extend_from_slice(&target_segments[common..]);

    let relative = if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    };

    match relative.strip_prefix("../") {
        Some(stripped) => stripped.to_string(),
        None => relative,
    }
}

/// Rewrites wiki links into links between files of the mirror
///
/// Holds the wiki's base URL and the frozen redirect table; cheap to clone.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    base_url: String,
    /// Scheme, host and port of `base_url`, without a trailing `/`
    origin: String,
    /// Path of `base_url`, `/` for a wiki served at the host root
    base_path: String,
    redirects: Arc<RedirectTable>,
}

impl LinkRewriter {
    /// Creates a rewriter for the wiki at `base_url` (ending in `/`)
    pub fn new(base_url: impl Into<String>, redirects: Arc<RedirectTable>) -> Self {
        let base_url = base_url.into();
        let (origin, base_path) = match Url::parse(&base_url) {
            Ok(parsed) => (
                parsed.origin().ascii_serialization(),
                parsed.path().to_string(),
            ),
            Err(_) => (base_url.trim_end_matches('/').to_string(), "/".to_string()),
        };

        Self {
            base_url,
            origin,
            base_path,
            redirects,
        }
    }

    /// The wiki's absolute base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if `href` points into the wiki: absolute under the base URL,
    /// or site-root-relative (but not protocol-relative)
    pub fn is_wiki_link(&self, href: &str) -> bool {
        href.starts_with(self.base_url.as_str()) || is_root_relative(href)
    }

    /// Converts a wiki URL to a link relative to the page at `from`
    ///
    /// # Rewriting Steps
    ///
    /// 1. Split off a `#fragment`, re-appended at the end
    /// 2. Leave dynamic endpoints (anything with a query string) absolute,
    ///    resolving site-root paths against the wiki's origin
    /// 3. Strip the wiki base URL, the base URL's path or the leading `/`
    /// 4. Normalize the title and resolve it through the redirect table
    /// 5. Convert to the normalized output path and relativize against `from`
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute wiki URL or site-root-relative path
    /// * `from` - Normalized output path of the page containing the link
    pub fn make_url_relative(&self, url: &str, from: &str) -> String {
        let (location, fragment) = match url.split_once('#') {
            Some((location, fragment)) => (location, Some(fragment)),
            None => (url, None),
        };

        let mut href = if location.contains('?') {
            if is_root_relative(location) {
                format!("{}{}", self.origin, location)
            } else {
                location.to_string()
            }
        } else {
            let local = location
                .strip_prefix(self.base_url.as_str())
                .or_else(|| location.strip_prefix(self.base_path.as_str()))
                .or_else(|| location.strip_prefix('/'))
                .unwrap_or(location);
            let title = normalize_title(local);
            let resolved = self.redirects.resolve(&title);
            escape_href(&relativize(&to_normalized_path(resolved), from))
        };

        if let Some(fragment) = fragment {
            href.push('#');
            href.push_str(fragment);
        }

        href
    }
}

/// Returns true for `/path` but not for `//host/path`
pub fn is_root_relative(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

/// Escapes characters that decoded titles may contain but hrefs cannot
///
/// `:` is escaped so `File:Logo.png` is not read as a URL with a `file:` scheme.
fn escape_href(path: &str) -> String {
    path.replace('%', "%25")
        .replace('?', "%3F")
        .replace('#', "%23")
        .replace(':', "%3A")
}
