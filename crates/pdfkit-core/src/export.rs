//! Export of the edited text buffer.

use crate::error::PdfKitError;
use docx_rs::{Docx, Paragraph, Run};
use serde::Deserialize;
use std::io::Cursor;
use std::str::FromStr;

/// Target format for the extracted-text download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Docx,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Docx => "docx",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "txt" => Ok(ExportFormat::Txt),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(format!("unknown export format '{}'", other)),
        }
    }
}

/// Export the text as raw UTF-8 bytes.
pub fn export_txt(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Export the text as a minimal DOCX, one paragraph per line.
///
/// The paragraph boundary is the newline character; empty lines become
/// empty paragraphs.
pub fn export_docx(text: &str) -> Result<Vec<u8>, PdfKitError> {
    let mut docx = Docx::new();
    for line in text.lines() {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| PdfKitError::OperationError(format!("DOCX packing failed: {}", e)))?;
    Ok(cursor.into_inner())
}
