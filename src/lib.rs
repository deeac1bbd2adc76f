//! # docscan
//!
//! Scan an image or PDF and get back its tables, formulas and text.
//!
//! The recognition itself is done by an external document-structure engine
//! (layout detection + OCR + table and formula recognition). This crate is
//! everything around that one call: intake, decoding, caching the result per
//! document, and presenting it — in the browser or as files on disk.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (PNG / JPEG / PDF)
//!  │
//!  ├─ 1. Intake   UploadedDocument + identity key (name, size)
//!  ├─ 2. Decode   image → RGB, or PDF page 1 → pdfium raster at fixed scale
//!  ├─ 3. Engine   one blocking StructureEngine::predict call
//!  ├─ 4. Cache    one entry per session, evicted when the key changes
//!  └─ 5. Render   tables (+ CSV), formulas, free text, optional raw JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docscan::{ExtractionSession, ScanConfig, ScanContext, UploadedDocument};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanConfig::builder()
//!     .engine_url("http://127.0.0.1:8080")
//!     .build()?;
//! let ctx = ScanContext::from_config(config)?;
//!
//! let bytes = std::fs::read("invoice.png")?;
//! let mut session = ExtractionSession::new();
//! session.submit(UploadedDocument::new(bytes, "image/png", "invoice.png"));
//! let extraction = session.ensure_result(&ctx)?;
//!
//! let view = docscan::view::render(&extraction, false);
//! for table in &view.sections.tables {
//!     println!("Table {}: {:?}", table.number, table.csv);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docscan` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod view;
pub mod web;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ScanConfig, ScanConfigBuilder};
pub use document::{DocumentKind, IdentityKey, UploadedDocument};
pub use engine::{ExtractionResult, HttpStructureEngine, PageStructure, StructureEngine};
pub use error::{ConversionError, DecodeError, EngineError, ScanError};
pub use pipeline::rasterize::{PageRasterizer, PdfiumRasterizer};
pub use report::write_report;
pub use session::{Extraction, ExtractionSession, ScanContext};
pub use view::{render, ResultView};
