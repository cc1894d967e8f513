//! Text extraction.
//!
//! pdf-extract handles the content-stream decoding (CID fonts and
//! ToUnicode CMaps included); this module only stitches the per-page
//! strings together in page order.

use crate::error::PdfKitError;

/// Extract the text of every page, concatenated in page order.
///
/// Each page is introduced by a `--- Page N ---` header with a blank line
/// on either side of the body. Deterministic for a given input, so
/// re-extraction of unchanged bytes returns the identical string.
pub fn extract_text(bytes: &[u8]) -> Result<String, PdfKitError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PdfKitError::OperationError(format!("text extraction failed: {}", e)))?;

    let mut text = String::new();
    for (i, page) in pages.iter().enumerate() {
        text.push_str(&format!("--- Page {} ---\n\n", i + 1));
        text.push_str(page);
        text.push_str("\n\n");
    }
    Ok(text)
}
