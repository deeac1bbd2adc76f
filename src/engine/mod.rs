//! The document-structure engine seam.
//!
//! The pretrained layout/OCR/table/formula model is an external collaborator.
//! The scanner only needs one operation from it — turn an RGB raster into a
//! list of per-page structures — plus an optional startup check. Both live on
//! [`StructureEngine`], so tests and alternative backends can substitute their
//! own implementation.

mod http;
mod types;

pub use http::HttpStructureEngine;
pub use types::{
    BlockLabel, ExtractionResult, FormulaEntry, PageStructure, ParsedBlock, Region, TableEntry,
};

use crate::error::EngineError;
use image::RgbImage;

/// A document-structure/OCR engine.
///
/// `predict` is a single blocking call with no timeout; callers in async
/// contexts run it on a blocking thread. Implementations need not be
/// re-entrant: [`crate::session::ScanContext`] serialises calls.
pub trait StructureEngine: Send + Sync {
    /// Short name used in logs and the health endpoint.
    fn name(&self) -> &str;

    /// Verify the model source at startup. The default accepts unconditionally.
    fn check_source(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Recognise the layout of one RGB raster.
    fn predict(&self, image: &RgbImage) -> Result<Vec<PageStructure>, EngineError>;
}
