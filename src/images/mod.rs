//! Images module: local copies of the wiki's raster images
//!
//! Every image a page references is downloaded once, stored at its normalized
//! path and re-encoded as WebP, scaled down to a maximum edge length first.

mod calculations;
mod pipeline;

pub use calculations::{fit_within, needs_resize};
pub use pipeline::{download_image, mirror_image, recompress_image};
