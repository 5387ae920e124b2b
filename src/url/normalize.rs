//! Title, image-URL and output-path normalization
//!
//! All functions here are pure and work on plain strings; wiki titles and
//! site-root paths are not valid `Url`s on their own.

/// Normalizes a wiki title or path fragment
///
/// Percent-encoded sequences are decoded and spaces become underscores, which is
/// how MediaWiki spells titles in URLs. Decoding repeats until the title stops
/// changing, so a normalized title normalizes to itself. A layer that does not
/// decode to valid UTF-8 is left encoded.
///
/// # Examples
///
/// ```
/// use wiki_mirror::url::normalize_title;
///
/// assert_eq!(normalize_title("Command%2Fsetup frame"), "Command/setup_frame");
/// assert_eq!(normalize_title("Main_Page"), "Main_Page");
/// assert_eq!(normalize_title("50%2525"), "50%");
/// ```
pub fn normalize_title(raw: &str) -> String {
    let mut title = raw.to_string();

    // Every successful decode that changes the string makes it shorter
    while let Ok(decoded) = urlencoding::decode(&title) {
        if decoded == title {
            break;
        }
        title = decoded.into_owned();
    }

    title.replace(' ', "_")
}

/// Normalizes an image URL to the path its recompressed copy is stored at
///
/// # Normalization Steps
///
/// 1. Apply [`normalize_title`]
/// 2. Strip a thumbnail infix `<stem>/<digits>px-<stem>` back to `<stem>`
/// 3. Unless the file is an `.ico`, replace the extension with `.webp`
///
/// # Examples
///
/// ```
/// use wiki_mirror::url::normalize_image_url;
///
/// assert_eq!(normalize_image_url("Foo/80px-Foo.png"), "Foo.webp");
/// assert_eq!(
///     normalize_image_url("/images/thumb/a/ab/Foo.png/120px-Foo.png"),
///     "/images/thumb/a/ab/Foo.webp"
/// );
/// assert_eq!(normalize_image_url("icon.ico"), "icon.ico");
/// ```
pub fn normalize_image_url(raw: &str) -> String {
    let normalized = normalize_title(raw);
    let unscaled = strip_thumbnail_infix(&normalized);

    if extension(&unscaled).is_some_and(|ext| ext.eq_ignore_ascii_case("ico")) {
        return unscaled;
    }

    replace_extension(&unscaled, "webp")
}

/// Converts a normalized title to its absolute site-root output path
///
/// The empty title is the site root and maps to `/index.html`; anything without
/// a file extension gets `.html` appended.
///
/// # Examples
///
/// ```
/// use wiki_mirror::url::to_normalized_path;
///
/// assert_eq!(to_normalized_path(""), "/index.html");
/// assert_eq!(to_normalized_path("A/B"), "/A/B.html");
/// assert_eq!(to_normalized_path("A/B.png"), "/A/B.png");
/// ```
pub fn to_normalized_path(title: &str) -> String {
    let mut path = format!("/{}", title.trim_start_matches('/'));

    if path == "/" {
        path.push_str("index");
    }

    if extension(&path).is_none() {
        path.push_str(".html");
    }

    path
}

/// Returns the extension of the last path segment, without the dot
///
/// A leading dot (`.htaccess`) or a trailing dot (`foo.`) is not an extension.
pub(crate) fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(dot) if dot + 1 == name.len() => None,
        Some(dot) => Some(&name[dot + 1..]),
    }
}

fn replace_extension(path: &str, new_extension: &str) -> String {
    match extension(path) {
        Some(ext) => format!("{}{}", &path[..path.len() - ext.len()], new_extension),
        None => format!("{}.{}", path, new_extension),
    }
}

/// Rewrites `.../<stem>/<digits>px-<stem><rest>` to `.../<stem><rest>`
///
/// Both stems must match exactly; anything else is returned unchanged.
fn strip_thumbnail_infix(path: &str) -> String {
    let Some((head, last)) = path.rsplit_once('/') else {
        return path.to_string();
    };

    let (parent, stem) = match head.rsplit_once('/') {
        Some((parent, stem)) => (Some(parent), stem),
        None => (None, head),
    };

    if stem.is_empty() {
        return path.to_string();
    }

    let Some(rest) = strip_scale_prefix(last).and_then(|scaled| scaled.strip_prefix(stem)) else {
        return path.to_string();
    };

    match parent {
        Some(parent) => format!("{}/{}{}", parent, stem, rest),
        None => format!("{}{}", stem, rest),
    }
}

/// Strips a leading `<digits>px-` from a path segment
fn strip_scale_prefix(segment: &str) -> Option<&str> {
    let digits = segment.len() - segment.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    segment[digits..].strip_prefix("px-")
}
