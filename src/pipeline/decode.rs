//! Decoding: turn an [`UploadedDocument`] into an RGB raster.
//!
//! Raster uploads are decoded directly; the format is sniffed from the bytes
//! rather than trusted from the declared type, so a JPEG uploaded as `.png`
//! still decodes. PDFs go through a [`PageRasterizer`] which renders only the
//! first page.

use super::rasterize::PageRasterizer;
use crate::document::{DocumentKind, UploadedDocument};
use crate::error::DecodeError;
use image::{ImageReader, RgbImage};
use std::io::Cursor;
use tracing::debug;

/// Decode a document into the raster handed to the engine.
pub fn decode_document(
    doc: &UploadedDocument,
    rasterizer: &dyn PageRasterizer,
    pdf_scale: f32,
) -> Result<RgbImage, DecodeError> {
    match doc.kind()? {
        DocumentKind::Image => decode_image(doc.name(), doc.bytes()),
        DocumentKind::Pdf => rasterizer.first_page(doc.name(), doc.bytes(), pdf_scale),
    }
}

/// Decode PNG/JPEG bytes and convert to RGB.
pub fn decode_image(name: &str, bytes: &[u8]) -> Result<RgbImage, DecodeError> {
    let image_err = |detail: String| DecodeError::Image {
        name: name.to_string(),
        detail,
    };

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| image_err(e.to_string()))?;
    let format = reader.format();
    let image = reader.decode().map_err(|e| image_err(e.to_string()))?;

    debug!(
        "Decoded '{}' ({:?}) → {}x{} px",
        name,
        format,
        image.width(),
        image.height()
    );
    Ok(image.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, Rgba, RgbaImage};

    struct NoPdf;

    impl PageRasterizer for NoPdf {
        fn first_page(
            &self,
            name: &str,
            _bytes: &[u8],
            _scale: f32,
        ) -> Result<RgbImage, DecodeError> {
            Err(DecodeError::Pdf {
                name: name.to_string(),
                detail: "not available in tests".into(),
            })
        }
    }

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn png_decodes_to_rgb() {
        let rgba = RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);
        let img = decode_image("a.png", &bytes).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn jpeg_declared_as_png_still_decodes() {
        let rgb = RgbImage::from_pixel(8, 8, Rgb([200, 200, 200]));
        let bytes = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Jpeg);
        let doc = UploadedDocument::new(bytes, "image/png", "photo.png");
        let img = decode_document(&doc, &NoPdf, 2.0).unwrap();
        assert_eq!(img.dimensions(), (8, 8));
    }

    #[test]
    fn corrupt_bytes_are_decode_error() {
        let doc = UploadedDocument::new(b"definitely not an image".to_vec(), "image/jpeg", "x.jpg");
        let err = decode_document(&doc, &NoPdf, 2.0).unwrap_err();
        assert!(matches!(err, DecodeError::Image { ref name, .. } if name == "x.jpg"));
    }

    #[test]
    fn pdf_routes_to_rasterizer() {
        let doc = UploadedDocument::new(b"%PDF-1.7".to_vec(), "application/pdf", "a.pdf");
        let err = decode_document(&doc, &NoPdf, 2.0).unwrap_err();
        assert!(matches!(err, DecodeError::Pdf { .. }));
    }

    #[test]
    fn unsupported_type_fails_before_decoding() {
        let doc = UploadedDocument::new(b"hello".to_vec(), "text/plain", "a.txt");
        assert!(matches!(
            decode_document(&doc, &NoPdf, 2.0),
            Err(DecodeError::UnsupportedType { .. })
        ));
    }
}
