//! Split planning and page extraction.
//!
//! A split runs in two steps: `plan_ranges` turns the chosen mode into an
//! ordered list of inclusive 1-indexed page ranges, then each range is
//! materialized into a standalone PDF by deleting the complement pages from
//! a copy of the source.

use crate::error::PdfKitError;
use lopdf::Document;
use serde::Deserialize;
use std::collections::HashSet;

/// How the source document is carved into outputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SplitMode {
    /// One output per source page.
    Individual,
    /// Consecutive chunks of `pages_per_file` pages; the last chunk may be
    /// shorter.
    Ranges {
        #[serde(default = "default_pages_per_file")]
        pages_per_file: u32,
    },
    /// Caller-supplied inclusive 1-indexed (start, end) pairs. Ranges may
    /// overlap or arrive out of order; each is validated on its own.
    Custom { ranges: Vec<(u32, u32)> },
}

fn default_pages_per_file() -> u32 {
    2
}

/// An inclusive, 1-indexed block of source pages destined for one output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn page_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Compute the ordered output ranges for a mode against a page count.
pub fn plan_ranges(mode: &SplitMode, page_count: u32) -> Result<Vec<PageRange>, PdfKitError> {
    match mode {
        SplitMode::Individual => Ok((1..=page_count)
            .map(|page| PageRange {
                start: page,
                end: page,
            })
            .collect()),

        SplitMode::Ranges { pages_per_file } => {
            let chunk = *pages_per_file;
            if chunk < 1 {
                return Err(PdfKitError::InvalidChunkSize(chunk));
            }

            let mut ranges = Vec::new();
            let mut start = 1;
            while start <= page_count {
                let end = (start + chunk - 1).min(page_count);
                ranges.push(PageRange { start, end });
                start = end + 1;
            }
            Ok(ranges)
        }

        SplitMode::Custom { ranges } => {
            let mut planned = Vec::with_capacity(ranges.len());
            for &(start, end) in ranges {
                if start < 1 || start > end || end > page_count {
                    return Err(PdfKitError::InvalidRange(format!(
                        "({}, {}) is not within 1-{}",
                        start, end, page_count
                    )));
                }
                planned.push(PageRange { start, end });
            }
            Ok(planned)
        }
    }
}

/// Output filename for the range at `index`, following the mode's pattern.
pub fn output_filename(mode: &SplitMode, index: usize, range: PageRange) -> String {
    match mode {
        SplitMode::Individual => format!("page_{}.pdf", range.start),
        SplitMode::Ranges { .. } => format!(
            "part_{}_pages_{}-{}.pdf",
            index + 1,
            range.start,
            range.end
        ),
        SplitMode::Custom { .. } => format!(
            "range_{}_pages_{}-{}.pdf",
            index + 1,
            range.start,
            range.end
        ),
    }
}

/// Extract one contiguous page range into a standalone PDF.
///
/// The caller is expected to have validated the range against the page
/// count (plan_ranges does); a range past the end still fails here via the
/// keep-set check.
pub fn extract_range(bytes: &[u8], range: PageRange) -> Result<Vec<u8>, PdfKitError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfKitError::ParseError(e.to_string()))?;

    let page_count = doc.get_pages().len() as u32;
    if range.start < 1 || range.start > range.end || range.end > page_count {
        return Err(PdfKitError::InvalidRange(format!(
            "({}, {}) is not within 1-{}",
            range.start, range.end, page_count
        )));
    }

    let keep: HashSet<u32> = (range.start..=range.end).collect();
    let mut trimmed = doc.clone();

    // Delete in reverse so earlier deletions don't shift later page numbers.
    let mut discard: Vec<u32> = (1..=page_count).filter(|p| !keep.contains(p)).collect();
    discard.reverse();
    for page in discard {
        trimmed.delete_pages(&[page]);
    }

    trimmed.prune_objects();
    trimmed.compress();

    let mut buffer = Vec::new();
    trimmed
        .save_to(&mut buffer)
        .map_err(|e| PdfKitError::OperationError(format!("save failed: {}", e)))?;
    Ok(buffer)
}
