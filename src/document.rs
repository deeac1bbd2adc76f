//! Uploaded documents and their identity.
//!
//! An [`UploadedDocument`] is immutable once read. Its [`IdentityKey`] — the
//! file name plus its byte size — is what tells "a new document was
//! uploaded" apart from "the same document, another UI interaction".

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const MIME_PDF: &str = "application/pdf";

/// Name + size pair identifying an upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentityKey {
    pub name: String,
    pub size: u64,
}

impl IdentityKey {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.name, self.size)
    }
}

/// How the bytes of a document are turned into a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// PNG or JPEG, decoded directly.
    Image,
    /// PDF; only the first page is rasterised.
    Pdf,
}

impl DocumentKind {
    /// Resolve the kind from a declared MIME type, falling back to the file
    /// extension when the declared type is absent or generic.
    pub fn resolve(mime: &str, file_name: &str) -> Result<Self, DecodeError> {
        let declared = mime.trim().to_ascii_lowercase();
        if let Some(kind) = Self::from_mime(&declared) {
            return Ok(kind);
        }

        if declared.is_empty() || declared == "application/octet-stream" {
            let guessed = mime_guess::from_path(file_name).first_raw().unwrap_or("");
            if let Some(kind) = Self::from_mime(guessed) {
                return Ok(kind);
            }
        }

        Err(DecodeError::UnsupportedType {
            mime: if declared.is_empty() {
                file_name.to_string()
            } else {
                declared
            },
        })
    }

    fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/png" | "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(DocumentKind::Image),
            MIME_PDF => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

/// One uploaded file: raw bytes, declared type and identity.
#[derive(Clone)]
pub struct UploadedDocument {
    bytes: Arc<[u8]>,
    mime_type: String,
    key: IdentityKey,
}

impl UploadedDocument {
    /// Wrap uploaded bytes. The identity key is derived from `name` and the
    /// byte length.
    pub fn new(
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let bytes: Vec<u8> = bytes.into();
        let key = IdentityKey::new(name, bytes.len() as u64);
        Self::with_key(bytes, mime_type, key)
    }

    /// Wrap uploaded bytes under an explicit identity key.
    pub fn with_key(
        bytes: impl Into<Vec<u8>>,
        mime_type: impl Into<String>,
        key: IdentityKey,
    ) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
            mime_type: mime_type.into(),
            key,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// The decode path for this upload.
    pub fn kind(&self) -> Result<DocumentKind, DecodeError> {
        DocumentKind::resolve(&self.mime_type, &self.key.name)
    }
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("key", &self.key)
            .field("mime_type", &self.mime_type)
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_display_matches_name_size() {
        let key = IdentityKey::new("invoice.pdf", 1234);
        assert_eq!(key.to_string(), "invoice.pdf_1234");
    }

    #[test]
    fn key_derived_from_name_and_length() {
        let doc = UploadedDocument::new(vec![0u8; 42], "image/png", "scan.png");
        assert_eq!(doc.key(), &IdentityKey::new("scan.png", 42));
    }

    #[test]
    fn declared_mime_wins() {
        assert_eq!(
            DocumentKind::resolve("application/pdf", "weird.png").unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::resolve("image/jpeg", "photo").unwrap(),
            DocumentKind::Image
        );
    }

    #[test]
    fn generic_mime_falls_back_to_extension() {
        assert_eq!(
            DocumentKind::resolve("application/octet-stream", "report.PDF").unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::resolve("", "table.jpg").unwrap(),
            DocumentKind::Image
        );
    }

    #[test]
    fn unsupported_types_rejected() {
        let err = DocumentKind::resolve("text/plain", "notes.txt").unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnsupportedType {
                mime: "text/plain".into()
            }
        );
        assert!(DocumentKind::resolve("", "archive.zip").is_err());
    }

    #[test]
    fn debug_hides_bytes() {
        let doc = UploadedDocument::new(vec![1u8; 8], "image/png", "a.png");
        let dbg = format!("{doc:?}");
        assert!(dbg.contains("<8 bytes>"), "got: {dbg}");
    }
}
