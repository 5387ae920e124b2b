//! Image download and recompression
//!
//! | Step | Runs on |
//! |------|---------|
//! | Download, write raw bytes | async runtime |
//! | Decode, resize (`Lanczos3`), encode lossless WebP | blocking pool |

use crate::images::calculations::{fit_within, needs_resize};
use crate::output::output_path;
use crate::url::{extension, normalize_image_url};
use crate::wiki::WikiClient;
use crate::{MirrorError, Result};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Downloads `src` and writes it, unmodified, to its normalized output path
///
/// # Arguments
///
/// * `client` - Wiki client used for the raw fetch
/// * `src` - Site-root-relative image source as found in the page
/// * `output_dir` - Root of the mirror
///
/// # Returns
///
/// The path the bytes were written to
pub async fn download_image(client: &WikiClient, src: &str, output_dir: &Path) -> Result<PathBuf> {
    let bytes = client.raw_get(src, &[]).await?;

    let target = output_path(output_dir, &normalize_image_url(src));
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&target, &bytes).await?;

    tracing::trace!("Wrote {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}

/// Recompresses the image at `path` in place on the blocking pool
///
/// Icons are left alone. Anything larger than `max_dimension` on either edge is
/// scaled down to fit first.
pub async fn recompress_image(path: PathBuf, max_dimension: u32) -> Result<()> {
    if is_icon(&path) {
        return Ok(());
    }

    tokio::task::spawn_blocking(move || recompress_in_place(&path, max_dimension)).await?
}

/// Downloads an image, then recompresses it
pub async fn mirror_image(
    client: &WikiClient,
    src: &str,
    output_dir: &Path,
    max_dimension: u32,
) -> Result<PathBuf> {
    let path = download_image(client, src, output_dir).await?;
    recompress_image(path.clone(), max_dimension).await?;
    Ok(path)
}

fn is_icon(path: &Path) -> bool {
    path.to_str()
        .and_then(extension)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ico"))
}

fn recompress_in_place(path: &Path, max_dimension: u32) -> Result<()> {
    let image_error = |source| MirrorError::Image {
        path: path.display().to_string(),
        source,
    };

    let bytes = std::fs::read(path)?;
    let image = image::load_from_memory(&bytes).map_err(image_error)?;

    let image = if needs_resize(image.width(), image.height(), max_dimension) {
        let (width, height) = fit_within(image.width(), image.height(), max_dimension);
        image.resize_exact(width, height, FilterType::Lanczos3)
    } else {
        image
    };

    let encoded = encode_webp(&image).map_err(image_error)?;
    std::fs::write(path, encoded)?;
    Ok(())
}

/// Encodes as lossless WebP; no metadata is carried over
fn encode_webp(image: &DynamicImage) -> std::result::Result<Vec<u8>, image::ImageError> {
    // The encoder only takes 8-bit RGB(A)
    let image = if image.color().has_alpha() {
        DynamicImage::ImageRgba8(image.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(image.to_rgb8())
    };

    let mut buffer = Cursor::new(Vec::new());
    image.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
    Ok(buffer.into_inner())
}
