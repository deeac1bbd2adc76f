//! Internal stages of a scan.
//!
//! ```text
//! UploadedDocument
//!  ├─ decode     PNG/JPEG → RGB, or PDF → rasterize (page 1 at fixed scale)
//!  ├─ encode     RGB → PNG → base64 (engine request, inline preview)
//!  └─ tabular    table HTML → CSV (downloads, best effort)
//! ```
//!
//! Each stage is synchronous; the web layer moves the blocking ones off the
//! async executor.

pub mod decode;
pub mod encode;
pub mod rasterize;
pub mod tabular;
