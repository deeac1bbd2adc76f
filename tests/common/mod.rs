//! Shared fixtures for the integration tests: an in-process structure engine,
//! a PDF rasteriser that needs no pdfium, and small encoded images.

#![allow(dead_code)]

use docscan::engine::{FormulaEntry, ParsedBlock, TableEntry};
use docscan::{
    DecodeError, EngineError, PageRasterizer, PageStructure, ScanConfig, ScanContext,
    StructureEngine,
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const TABLE_HTML: &str =
    "<html><body><table><tr><td>Item</td><td>Qty</td></tr><tr><td>Bolt</td><td>4</td></tr></table></body></html>";

/// Engine that answers from a fixed script and counts its calls.
pub struct StubEngine {
    reply: Result<Vec<PageStructure>, EngineError>,
    source_ok: bool,
    calls: AtomicUsize,
    checks: AtomicUsize,
    last_size: Mutex<Option<(u32, u32)>>,
}

impl StubEngine {
    pub fn new(pages: Vec<PageStructure>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(pages),
            source_ok: true,
            calls: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
            last_size: Mutex::new(None),
        })
    }

    pub fn failing(err: EngineError) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(err),
            source_ok: true,
            calls: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
            last_size: Mutex::new(None),
        })
    }

    pub fn unreachable_source() -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(Vec::new()),
            source_ok: false,
            calls: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
            last_size: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn last_size(&self) -> Option<(u32, u32)> {
        *self.last_size.lock().unwrap()
    }
}

impl StructureEngine for StubEngine {
    fn name(&self) -> &str {
        "stub"
    }

    fn check_source(&self) -> Result<(), EngineError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.source_ok {
            Ok(())
        } else {
            Err(EngineError::Unavailable {
                engine: "stub".into(),
                detail: "model source unreachable".into(),
            })
        }
    }

    fn predict(&self, image: &RgbImage) -> Result<Vec<PageStructure>, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_size.lock().unwrap() = Some(image.dimensions());
        self.reply.clone()
    }
}

/// Renders every PDF as a blank page of `scale * 100` pixels square.
#[derive(Default)]
pub struct StubRasterizer {
    pub scales: Mutex<Vec<f32>>,
}

impl PageRasterizer for StubRasterizer {
    fn first_page(&self, name: &str, bytes: &[u8], scale: f32) -> Result<RgbImage, DecodeError> {
        if !bytes.starts_with(b"%PDF") {
            return Err(DecodeError::Pdf {
                name: name.to_string(),
                detail: "missing %PDF header".into(),
            });
        }
        self.scales.lock().unwrap().push(scale);
        let side = (scale * 100.0) as u32;
        Ok(RgbImage::from_pixel(side, side, Rgb([255, 255, 255])))
    }
}

pub fn config() -> ScanConfig {
    ScanConfig::builder()
        .skip_model_source_check(true)
        .build()
        .unwrap()
}

pub fn context(engine: Arc<StubEngine>) -> ScanContext {
    ScanContext::new(engine, Arc::new(StubRasterizer::default()), config())
}

pub fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([200, 180, 40]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encoded(width, height, ImageFormat::Jpeg)
}

/// A page with one table, one formula and prose around them.
pub fn invoice_page() -> PageStructure {
    PageStructure {
        table_res_list: vec![TableEntry {
            pred_html: TABLE_HTML.into(),
            ..Default::default()
        }],
        formula_res_list: vec![FormulaEntry {
            rec_formula: "E = mc^2".into(),
            ..Default::default()
        }],
        parsing_res_list: vec![
            ParsedBlock::new("doc_title", "Invoice 42"),
            ParsedBlock::new("table", TABLE_HTML),
            ParsedBlock::new("formula", "E = mc^2"),
            ParsedBlock::new("text", "Thank you for your business."),
        ],
        ..Default::default()
    }
}
