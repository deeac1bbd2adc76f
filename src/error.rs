//! Error types for the docscan library.
//!
//! Two classes of failure exist, mirroring how the scanner reacts to them:
//!
//! * [`ScanError`] — **Terminal** for the current document. Wraps a
//!   [`DecodeError`] (the upload could not be turned into a raster) or an
//!   [`EngineError`] (the structure engine was unavailable, raised, or found
//!   nothing). Reported to the user; no retry, no partial result.
//!
//! * [`ConversionError`] — **Contained**: one table's HTML could not be turned
//!   into CSV. The table is still shown, only its download link is dropped.

use thiserror::Error;

/// All terminal errors returned by the extraction session.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The upload could not be decoded into an image.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The structure engine failed for this document.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// `ensure_result` was called before any document was submitted.
    #[error("No document has been uploaded yet")]
    NoDocument,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (task join failure, poisoned lock).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The document bytes could not be turned into an RGB raster.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Declared type is neither a raster image nor a PDF.
    #[error("Unsupported file type '{mime}'. Supported formats: PNG, JPG, PDF")]
    UnsupportedType { mime: String },

    /// Image bytes are corrupt or in a format the decoder does not know.
    #[error("Could not decode image '{name}': {detail}")]
    Image { name: String, detail: String },

    /// pdfium rejected the PDF (corrupt, encrypted, truncated).
    #[error("Could not open PDF '{name}': {detail}")]
    Pdf { name: String, detail: String },

    /// The PDF opened but contains no pages.
    #[error("PDF '{name}' has no pages")]
    EmptyPdf { name: String },

    /// No pdfium library could be bound.
    #[error(
        "PDF rendering is unavailable: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    RasterizerUnavailable(String),
}

/// The structure engine could not produce a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The engine failed its startup check or could not be reached.
    #[error("Scanner error: engine '{engine}' is unavailable: {detail}")]
    Unavailable { engine: String, detail: String },

    /// The call itself raised (transport failure, malformed response).
    #[error("Error during processing: {0}")]
    Failed(String),

    /// The engine answered with a non-zero error code.
    #[error("Engine rejected the document (code {code}): {message}")]
    Rejected { code: i64, message: String },

    /// The engine returned an empty page list.
    #[error("Could not extract any data from this document.")]
    NoResults,
}

/// A table's HTML could not be converted to CSV.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// No `<table>` element was found in the markup.
    #[error("no <table> element found")]
    NoTable,

    /// The table element has no rows with cells.
    #[error("table has no rows")]
    NoRows,
}

impl ScanError {
    /// HTTP status the web UI uses when reporting this error.
    pub fn status_code(&self) -> u16 {
        match self {
            ScanError::Decode(_) => 422,
            ScanError::Engine(EngineError::NoResults) => 422,
            ScanError::Engine(_) => 502,
            ScanError::NoDocument => 400,
            ScanError::InvalidConfig(_) | ScanError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_results_message_is_user_facing() {
        let e = ScanError::from(EngineError::NoResults);
        assert_eq!(e.to_string(), "Could not extract any data from this document.");
        assert_eq!(e.status_code(), 422);
    }

    #[test]
    fn unsupported_type_lists_formats() {
        let e = DecodeError::UnsupportedType {
            mime: "text/plain".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("text/plain"), "got: {msg}");
        assert!(msg.contains("PNG, JPG, PDF"));
    }

    #[test]
    fn engine_failures_map_to_bad_gateway() {
        let e = ScanError::from(EngineError::Failed("connection reset".into()));
        assert_eq!(e.status_code(), 502);
        assert!(e.to_string().contains("connection reset"));
    }

    #[test]
    fn decode_failures_map_to_unprocessable() {
        let e = ScanError::from(DecodeError::EmptyPdf {
            name: "blank.pdf".into(),
        });
        assert_eq!(e.status_code(), 422);
        assert!(e.to_string().contains("blank.pdf"));
    }
}
