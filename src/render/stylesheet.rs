//! Site stylesheet fetched from the wiki's ResourceLoader

use crate::wiki::WikiClient;
use crate::Result;
use regex::Regex;
use std::sync::LazyLock;

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("comment regex is valid"));

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@import[^;]*;\s*").expect("import regex is valid"));

/// Fetches the styles of `modules` in `language`
pub async fn fetch_stylesheet(client: &WikiClient, modules: &str, language: &str) -> Result<String> {
    let bytes = client
        .raw_get(
            "load.php",
            &[
                ("lang", language),
                ("modules", modules),
                ("only", "styles"),
                ("skin", "vector"),
            ],
        )
        .await?;

    Ok(sanitize_stylesheet(&String::from_utf8_lossy(&bytes)))
}

/// Strips comments and `@import` rules
///
/// Imports would pull styles from the live wiki into the offline copy.
pub fn sanitize_stylesheet(css: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(css, "");
    let without_imports = IMPORT_RE.replace_all(&without_comments, "");
    without_imports.trim().to_string()
}
