//! Upload validation and document metadata.
//!
//! Uploads are checked against the declared content type and the `%PDF-`
//! signature before lopdf parses them for a page count.

use crate::error::PdfKitError;
use lopdf::Document;
use serde::Serialize;

/// Content types the upload check accepts.
const PDF_CONTENT_TYPES: &[&str] = &["application/pdf", "application/x-pdf"];

/// Raw upload as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// One accepted PDF upload.
///
/// Immutable once stored; a re-upload replaces the whole value.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub page_count: u32,
    pub size_display: String,
}

/// Serializable document metadata for response payloads.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub page_count: u32,
    pub size_display: String,
}

impl From<&UploadedDocument> for DocumentInfo {
    fn from(doc: &UploadedDocument) -> Self {
        Self {
            filename: doc.filename.clone(),
            page_count: doc.page_count,
            size_display: doc.size_display.clone(),
        }
    }
}

impl UploadedDocument {
    /// Validate an upload and build the stored document record.
    pub fn accept(upload: FileUpload) -> Result<Self, PdfKitError> {
        if !PDF_CONTENT_TYPES.contains(&upload.content_type.as_str()) {
            return Err(PdfKitError::InvalidFileKind(format!(
                "unsupported content type '{}'",
                upload.content_type
            )));
        }

        if upload.bytes.len() < 8 || !upload.bytes.starts_with(b"%PDF-") {
            return Err(PdfKitError::InvalidFileKind(
                "missing %PDF- header".into(),
            ));
        }

        let document = Document::load_mem(&upload.bytes)
            .map_err(|e| PdfKitError::ParseError(e.to_string()))?;

        let page_count = document.get_pages().len() as u32;
        if page_count == 0 {
            return Err(PdfKitError::InvalidFileKind("PDF has no pages".into()));
        }

        Ok(Self {
            filename: upload.filename,
            size_display: format_file_size(upload.bytes.len()),
            page_count,
            bytes: upload.bytes,
        })
    }

    /// Filename without the `.pdf` suffix, for derived output names.
    pub fn stem(&self) -> &str {
        self.filename
            .strip_suffix(".pdf")
            .unwrap_or(&self.filename)
    }
}

/// Format a byte count the way the file list displays it ("1.25 MB").
pub fn format_file_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", size, UNITS[unit])
}
