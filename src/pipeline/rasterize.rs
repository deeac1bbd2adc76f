//! PDF rasterisation: render the first page of a PDF via pdfium.
//!
//! pdfium keeps thread-local state and is not safe to drive from async code;
//! callers in the web server reach this through `spawn_blocking`.
//!
//! Only page one is rendered, at a fixed scale factor, regardless of how many
//! pages the document has.

use crate::error::DecodeError;
use image::RgbImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Turns PDF bytes into a raster of their first page.
///
/// A trait so sessions can be exercised without a pdfium library present.
pub trait PageRasterizer: Send + Sync {
    fn first_page(&self, name: &str, bytes: &[u8], scale: f32) -> Result<RgbImage, DecodeError>;
}

/// [`PageRasterizer`] backed by pdfium-render.
///
/// The library is bound per call: pdfium's global state is then only touched
/// from the thread doing the rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfiumRasterizer;

impl PdfiumRasterizer {
    /// Bind pdfium: `PDFIUM_LIB_PATH`, then `./lib`, then the system library.
    fn bind() -> Result<Pdfium, DecodeError> {
        let from_env = std::env::var("PDFIUM_LIB_PATH")
            .ok()
            .filter(|p| !p.is_empty())
            .map(|p| Pdfium::bind_to_library(p));

        let bindings = match from_env {
            Some(Ok(b)) => Ok(b),
            Some(Err(e)) => Err(e),
            None => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./lib/"))
                .or_else(|_| Pdfium::bind_to_system_library()),
        }
        .map_err(|e| DecodeError::RasterizerUnavailable(format!("{:?}", e)))?;

        Ok(Pdfium::new(bindings))
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn first_page(&self, name: &str, bytes: &[u8], scale: f32) -> Result<RgbImage, DecodeError> {
        let pdfium = Self::bind()?;

        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| DecodeError::Pdf {
                name: name.to_string(),
                detail: format!("{:?}", e),
            })?;

        let pages = document.pages();
        info!("PDF '{}' loaded: {} pages, rendering page 1", name, pages.len());

        let page = pages.first().map_err(|_| DecodeError::EmptyPdf {
            name: name.to_string(),
        })?;

        let render_config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| DecodeError::Pdf {
                name: name.to_string(),
                detail: format!("{:?}", e),
            })?;

        let image = bitmap.as_image().to_rgb8();
        debug!(
            "Rendered page 1 of '{}' → {}x{} px",
            name,
            image.width(),
            image.height()
        );
        Ok(image)
    }
}
