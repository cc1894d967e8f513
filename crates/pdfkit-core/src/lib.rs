//! PDF toolkit core
//!
//! Session-scoped merge, split, and text-extraction flows over lopdf and
//! pdf-extract. The three tab flows are independent state machines
//! ([`MergeSession`], [`SplitSession`], [`ConvertSession`]) sharing only
//! the upload validation; an embedding layer (HTTP server, desktop shell)
//! supplies transport, session keying, and response formatting.

pub mod document;
pub mod error;
pub mod export;
pub mod extract;
pub mod merge;
pub mod session;
pub mod split;

#[cfg(test)]
pub(crate) mod test_pdf;

pub use document::{format_file_size, DocumentInfo, FileUpload, UploadedDocument};
pub use error::PdfKitError;
pub use export::ExportFormat;
pub use extract::extract_text;
pub use merge::merge_documents;
pub use session::{
    AddFilesOutcome, ConvertSession, MergeSession, OutputFile, RejectedFile, SplitSession,
    ToolkitSession,
};
pub use split::{output_filename, plan_ranges, PageRange, SplitMode};

/// Parse PDF bytes and return the page count.
pub fn get_page_count(bytes: &[u8]) -> Result<u32, PdfKitError> {
    let doc =
        lopdf::Document::load_mem(bytes).map_err(|e| PdfKitError::ParseError(e.to_string()))?;
    Ok(doc.get_pages().len() as u32)
}
