//! Output directory handling

use crate::url::to_normalized_path;
use crate::Result;
use std::path::{Path, PathBuf};

/// Joins a normalized site-root path onto the output directory
pub fn output_path(output_dir: &Path, site_path: &str) -> PathBuf {
    output_dir.join(site_path.trim_start_matches('/'))
}

/// Empties `output_dir`, keeping the top-level entries named in `preserve`
///
/// The directory is created if it does not exist yet.
pub async fn clear_output_dir(output_dir: &Path, preserve: &[String]) -> Result<()> {
    tokio::fs::create_dir_all(output_dir).await?;

    let mut entries = tokio::fs::read_dir(output_dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if preserve.iter().any(|kept| name.to_str() == Some(kept.as_str())) {
            tracing::debug!("Keeping {}", entry.path().display());
            continue;
        }

        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(entry.path()).await?;
        } else {
            tokio::fs::remove_file(entry.path()).await?;
        }
    }

    Ok(())
}

/// Moves the rendered home page to the site's `index.html`
///
/// # Returns
///
/// * `Ok(true)` - The home page was moved
/// * `Ok(false)` - No rendered home page was found
pub async fn move_home_to_index(output_dir: &Path, home_title: &str) -> Result<bool> {
    let home = output_path(output_dir, &to_normalized_path(home_title));
    let index = output_path(output_dir, &to_normalized_path(""));

    if home == index {
        return Ok(tokio::fs::try_exists(&index).await?);
    }

    if !tokio::fs::try_exists(&home).await? {
        tracing::warn!("Home page {} was not rendered", home.display());
        return Ok(false);
    }

    tokio::fs::rename(&home, &index).await?;
    Ok(true)
}
