//! The document extraction session.
//!
//! A session holds at most one document and at most one cached extraction.
//! The cache has two states — empty, or populated for one [`IdentityKey`] —
//! and one transition: submitting a document with a different key empties it.
//! Everything else (toggling the JSON view, downloading a table) re-renders
//! the cached [`Extraction`] without touching the engine.
//!
//! The expensive collaborators live in a [`ScanContext`], built once per
//! process and passed into [`ExtractionSession::ensure_result`] by reference.

use crate::config::ScanConfig;
use crate::document::{IdentityKey, UploadedDocument};
use crate::engine::{ExtractionResult, HttpStructureEngine, StructureEngine};
use crate::error::{EngineError, ScanError};
use crate::pipeline::decode::decode_document;
use crate::pipeline::rasterize::{PageRasterizer, PdfiumRasterizer};
use crate::view::{self, ResultView};
use image::RgbImage;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Process-lifetime dependencies shared by every session.
pub struct ScanContext {
    engine: Arc<dyn StructureEngine>,
    rasterizer: Arc<dyn PageRasterizer>,
    config: ScanConfig,
    /// Serialises engine calls; the engine is not assumed re-entrant.
    engine_gate: Mutex<()>,
}

impl ScanContext {
    /// Assemble a context without any startup check.
    pub fn new(
        engine: Arc<dyn StructureEngine>,
        rasterizer: Arc<dyn PageRasterizer>,
        config: ScanConfig,
    ) -> Self {
        Self {
            engine,
            rasterizer,
            config,
            engine_gate: Mutex::new(()),
        }
    }

    /// Assemble a context and run the engine's model-source check, unless
    /// `config.skip_model_source_check` is set.
    ///
    /// A failed check is terminal: the scanner cannot serve anything.
    pub fn start(
        engine: Arc<dyn StructureEngine>,
        rasterizer: Arc<dyn PageRasterizer>,
        config: ScanConfig,
    ) -> Result<Self, ScanError> {
        if config.skip_model_source_check {
            info!("Model source check disabled; skipping engine check");
        } else {
            let start = Instant::now();
            engine.check_source()?;
            info!(
                "Engine '{}' passed source check in {}ms",
                engine.name(),
                start.elapsed().as_millis()
            );
        }
        Ok(Self::new(engine, rasterizer, config))
    }

    /// The production wiring: HTTP engine at `config.engine_url`, pdfium for PDFs.
    pub fn from_config(config: ScanConfig) -> Result<Self, ScanError> {
        let engine = HttpStructureEngine::new(config.engine_url.clone())?;
        Self::start(Arc::new(engine), Arc::new(PdfiumRasterizer), config)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    pub fn rasterizer(&self) -> &dyn PageRasterizer {
        self.rasterizer.as_ref()
    }

    /// One engine call. An empty page list is an error.
    fn predict(&self, image: &RgbImage) -> Result<ExtractionResult, EngineError> {
        let _guard = self
            .engine_gate
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let pages = self.engine.predict(image)?;
        if pages.is_empty() {
            warn!("Engine '{}' returned no pages", self.engine.name());
            return Err(EngineError::NoResults);
        }
        Ok(ExtractionResult::new(pages))
    }
}

/// A decoded document together with what the engine found in it.
#[derive(Debug)]
pub struct Extraction {
    key: IdentityKey,
    image: RgbImage,
    result: ExtractionResult,
}

impl Extraction {
    pub fn new(key: IdentityKey, image: RgbImage, result: ExtractionResult) -> Self {
        Self { key, image, result }
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    /// The raster the engine saw (page one for PDFs).
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn result(&self) -> &ExtractionResult {
        &self.result
    }
}

/// Single-document extraction session with a one-entry result cache.
#[derive(Debug, Default)]
pub struct ExtractionSession {
    document: Option<UploadedDocument>,
    cached: Option<Arc<Extraction>>,
}

impl ExtractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a newly uploaded document. A different identity key evicts the
    /// cached extraction; the same key keeps it.
    pub fn submit(&mut self, document: UploadedDocument) {
        let same_key = self
            .cached
            .as_ref()
            .is_some_and(|c| c.key() == document.key());

        if !same_key {
            if let Some(old) = self.cached.take() {
                debug!("Evicting cached extraction for '{}'", old.key());
            }
        }
        debug!("Submitted '{}' ({})", document.key(), document.mime_type());
        self.document = Some(document);
    }

    /// Return the extraction for the current document, computing it on the
    /// first call for this identity key.
    ///
    /// Decode failures return before the engine is called; neither decode nor
    /// engine failures write to the cache.
    pub fn ensure_result(&mut self, ctx: &ScanContext) -> Result<Arc<Extraction>, ScanError> {
        let document = self.document.as_ref().ok_or(ScanError::NoDocument)?;

        if let Some(cached) = &self.cached {
            if cached.key() == document.key() {
                debug!("Cache hit for '{}'", cached.key());
                return Ok(Arc::clone(cached));
            }
        }

        info!("Processing '{}'", document.key());
        let start = Instant::now();

        let image = decode_document(document, ctx.rasterizer(), ctx.config().pdf_scale)?;
        let decoded_ms = start.elapsed().as_millis();

        let result = ctx.predict(&image)?;
        info!(
            "Extracted '{}': {} page(s), decode {}ms, total {}ms",
            document.key(),
            result.pages.len(),
            decoded_ms,
            start.elapsed().as_millis()
        );

        let extraction = Arc::new(Extraction::new(document.key().clone(), image, result));
        self.cached = Some(Arc::clone(&extraction));
        Ok(extraction)
    }

    /// The cached extraction for the current document, if any.
    pub fn cached(&self) -> Option<Arc<Extraction>> {
        let cached = self.cached.as_ref()?;
        match &self.document {
            Some(doc) if doc.key() == cached.key() => Some(Arc::clone(cached)),
            _ => None,
        }
    }

    pub fn document(&self) -> Option<&UploadedDocument> {
        self.document.as_ref()
    }

    /// Render the cached extraction, if there is one.
    pub fn render(&self, show_json: bool) -> Option<ResultView> {
        self.cached().map(|e| view::render(&e, show_json))
    }
}
