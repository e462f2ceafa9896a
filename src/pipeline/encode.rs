//! Page encoding: raw image bytes and rendered PDF pages → base64 [`Page`]s.
//!
//! Image files are passed through byte-for-byte; the model accepts PNG, JPEG
//! and WebP as-is, and re-encoding would only lose quality. Rendered PDF pages
//! are JPEG-encoded, which keeps a many-page request well under the inline
//! payload limits of the generation API.

use crate::output::Page;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;

/// MIME type of every rendered PDF page.
pub const JPEG_MIME: &str = "image/jpeg";

/// Wrap an image file's bytes unchanged, keeping its MIME type.
pub fn encode_image_bytes(mime_type: &str, bytes: &[u8]) -> Page {
    let b64 = STANDARD.encode(bytes);
    debug!("Encoded {} → {} bytes base64", mime_type, b64.len());
    Page::new(mime_type, b64)
}

/// Encode a rasterised PDF page as a base64 JPEG.
///
/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Page, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality).encode_image(&rgb)?;

    let b64 = STANDARD.encode(&buf);
    debug!(
        "Encoded {}x{} page → {} bytes base64",
        rgb.width(),
        rgb.height(),
        b64.len()
    );

    Ok(Page::new(JPEG_MIME, b64))
}
