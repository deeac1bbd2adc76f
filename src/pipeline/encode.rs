//! Image encoding: `RgbImage` → PNG bytes, base64, or a `data:` URI.
//!
//! PNG is lossless, so what the engine receives and what the user sees as
//! "Original Document" are pixel-identical to the decoded raster.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Encode a raster as PNG.
pub fn png_bytes(img: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

/// Encode a raster as base64 PNG, the form the engine API expects.
pub fn png_base64(img: &RgbImage) -> Result<String, image::ImageError> {
    Ok(STANDARD.encode(png_bytes(img)?))
}

/// Encode a raster as a `data:image/png;base64,…` URI for inline display.
pub fn png_data_uri(img: &RgbImage) -> Result<String, image::ImageError> {
    Ok(format!("data:image/png;base64,{}", png_base64(img)?))
}
