//! Session-scoped state machines for the three tab flows.
//!
//! Each tab (merge / split / convert) is an independent state machine over
//! the session store; they share only the upload validation in
//! [`UploadedDocument::accept`]. Processed outputs are derived state and are
//! invalidated by any mutation of the inputs they were derived from.
//!
//! Concurrent calls against the same session are not ordered here;
//! last-write-wins on the stored fields is the documented behavior for
//! single-user interactive sessions.

use crate::document::{format_file_size, DocumentInfo, FileUpload, UploadedDocument};
use crate::error::PdfKitError;
use crate::export::{export_docx, export_txt, ExportFormat};
use crate::extract::extract_text;
use crate::merge::merge_documents;
use crate::split::{extract_range, output_filename, plan_ranges, SplitMode};

/// Filename given to the merged document, matching the download the UI
/// always offered.
const MERGED_FILENAME: &str = "merged-document.pdf";

/// A finished artifact plus the metadata the response layer reports.
#[derive(Debug, Clone)]
pub struct OutputFile {
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Page count for PDF outputs; `None` for text exports.
    pub page_count: Option<u32>,
    pub size_display: String,
}

/// Per-entry failure from a multi-file upload.
#[derive(Debug)]
pub struct RejectedFile {
    pub filename: String,
    pub error: PdfKitError,
}

/// Outcome of a multi-file upload: accepted entries joined the list,
/// rejected entries carry their individual failure.
#[derive(Debug, Default)]
pub struct AddFilesOutcome {
    pub added: Vec<DocumentInfo>,
    pub rejected: Vec<RejectedFile>,
}

/// Ordered merge list plus its derived output.
#[derive(Debug, Default)]
pub struct MergeSession {
    documents: Vec<UploadedDocument>,
    output: Option<OutputFile>,
}

impl MergeSession {
    pub fn documents(&self) -> impl Iterator<Item = DocumentInfo> + '_ {
        self.documents.iter().map(DocumentInfo::from)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn output(&self) -> Option<&OutputFile> {
        self.output.as_ref()
    }

    /// Append every valid upload in order, reporting rejects per entry.
    ///
    /// A batch with zero valid files is not an error; it appends nothing.
    /// Any successful append invalidates a previously merged output.
    pub fn add_files(&mut self, files: Vec<FileUpload>) -> AddFilesOutcome {
        let mut outcome = AddFilesOutcome::default();

        for file in files {
            let filename = file.filename.clone();
            match UploadedDocument::accept(file) {
                Ok(doc) => {
                    outcome.added.push(DocumentInfo::from(&doc));
                    self.documents.push(doc);
                }
                Err(error) => outcome.rejected.push(RejectedFile { filename, error }),
            }
        }

        if !outcome.added.is_empty() {
            self.output = None;
        }
        outcome
    }

    /// Move the entry at `from` to position `to`; no-op when equal.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), PdfKitError> {
        let len = self.documents.len();
        for index in [from, to] {
            if index >= len {
                return Err(PdfKitError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let doc = self.documents.remove(from);
        self.documents.insert(to, doc);
        self.output = None;
        Ok(())
    }

    /// Concatenate every page of every document in the current order.
    pub fn process(&mut self) -> Result<&OutputFile, PdfKitError> {
        if self.documents.len() < 2 {
            return Err(PdfKitError::InsufficientInputs(self.documents.len()));
        }

        let sources: Vec<Vec<u8>> = self.documents.iter().map(|d| d.bytes.clone()).collect();
        let bytes = merge_documents(&sources)?;
        let page_count = self.documents.iter().map(|d| d.page_count).sum();

        Ok(&*self.output.insert(OutputFile {
            filename: MERGED_FILENAME.to_string(),
            size_display: format_file_size(bytes.len()),
            page_count: Some(page_count),
            bytes,
        }))
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.output = None;
    }
}

/// Single source document plus the outputs of the last split run.
#[derive(Debug, Default)]
pub struct SplitSession {
    document: Option<UploadedDocument>,
    outputs: Vec<OutputFile>,
}

impl SplitSession {
    pub fn document(&self) -> Option<DocumentInfo> {
        self.document.as_ref().map(DocumentInfo::from)
    }

    pub fn outputs(&self) -> &[OutputFile] {
        &self.outputs
    }

    /// Replace the source document; previous outputs are dropped.
    pub fn set_file(&mut self, upload: FileUpload) -> Result<DocumentInfo, PdfKitError> {
        let doc = UploadedDocument::accept(upload)?;
        let info = DocumentInfo::from(&doc);
        self.document = Some(doc);
        self.outputs.clear();
        Ok(info)
    }

    /// Plan ranges for the mode and materialize one output per range.
    pub fn process(&mut self, mode: &SplitMode) -> Result<&[OutputFile], PdfKitError> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfKitError::MissingDocument)?;

        let ranges = plan_ranges(mode, doc.page_count)?;
        let mut outputs = Vec::with_capacity(ranges.len());
        for (index, range) in ranges.into_iter().enumerate() {
            let bytes = extract_range(&doc.bytes, range)?;
            outputs.push(OutputFile {
                filename: output_filename(mode, index, range),
                page_count: Some(range.page_count()),
                size_display: format_file_size(bytes.len()),
                bytes,
            });
        }

        self.outputs = outputs;
        Ok(&self.outputs)
    }

    /// Fetch one produced output for download.
    pub fn output(&self, index: usize) -> Result<&OutputFile, PdfKitError> {
        self.outputs.get(index).ok_or(PdfKitError::IndexOutOfRange {
            index,
            len: self.outputs.len(),
        })
    }

    pub fn clear(&mut self) {
        self.document = None;
        self.outputs.clear();
    }
}

/// Single source document plus the extracted (and editable) text buffer.
#[derive(Debug, Default)]
pub struct ConvertSession {
    document: Option<UploadedDocument>,
    text: Option<String>,
}

impl ConvertSession {
    pub fn document(&self) -> Option<DocumentInfo> {
        self.document.as_ref().map(DocumentInfo::from)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Replace the source document; stored text is dropped with it.
    pub fn set_file(&mut self, upload: FileUpload) -> Result<DocumentInfo, PdfKitError> {
        let doc = UploadedDocument::accept(upload)?;
        let info = DocumentInfo::from(&doc);
        self.document = Some(doc);
        self.text = None;
        Ok(info)
    }

    /// Extract the text of every page in page order and store it as the
    /// session's editable buffer. Running it again on the same upload
    /// replaces the buffer with the identical extraction.
    pub fn extract(&mut self) -> Result<&str, PdfKitError> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfKitError::MissingDocument)?;

        let text = extract_text(&doc.bytes)?;
        Ok(&*self.text.insert(text))
    }

    /// Replace the stored text verbatim. No validation; the buffer simply
    /// accepts the latest full string on every call.
    pub fn update_text(&mut self, new_text: String) {
        self.text = Some(new_text);
    }

    /// Export the stored buffer in the requested format.
    pub fn export(&self, format: ExportFormat) -> Result<OutputFile, PdfKitError> {
        let text = self.text.as_deref().ok_or(PdfKitError::NoTextAvailable)?;

        let bytes = match format {
            ExportFormat::Txt => export_txt(text),
            ExportFormat::Docx => export_docx(text)?,
        };

        let stem = self
            .document
            .as_ref()
            .map(|d| d.stem().to_string())
            .unwrap_or_else(|| "extracted".to_string());

        Ok(OutputFile {
            filename: format!("{}-extracted.{}", stem, format.extension()),
            page_count: None,
            size_display: format_file_size(bytes.len()),
            bytes,
        })
    }

    pub fn clear(&mut self) {
        self.document = None;
        self.text = None;
    }
}

/// One user's three independent tab states.
#[derive(Debug, Default)]
pub struct ToolkitSession {
    pub merge: MergeSession,
    pub split: SplitSession,
    pub convert: ConvertSession,
}
