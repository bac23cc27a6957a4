//! Image encoding: `DynamicImage` → PNG → self-contained data URL.
//!
//! PNG is lossless, so text on a rendered page stays crisp at any zoom. The
//! data URL keeps each page record independent of any external handle: the
//! thumbnail, the per-page download, and the archive entry all read from it.

use crate::error::RendererError;
use crate::output::{DataUrl, RenderedPage};
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rasterised page as a PNG data URL.
pub fn encode_page(page: usize, img: &DynamicImage) -> Result<RenderedPage, RendererError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| RendererError::Encode {
            page,
            detail: e.to_string(),
        })?;

    let image = DataUrl::from_png(&buf);
    debug!(
        "Encoded page {} → {} bytes PNG, {} bytes data URL",
        page,
        buf.len(),
        image.encoded_len()
    );

    Ok(RenderedPage {
        page,
        width: img.width(),
        height: img.height(),
        image,
    })
}
