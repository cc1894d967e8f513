use thiserror::Error;

/// Failure taxonomy for toolkit operations.
///
/// Every variant is recoverable at the request boundary: the caller reports
/// the message and the session stays usable.
#[derive(Error, Debug)]
pub enum PdfKitError {
    #[error("Not a valid PDF upload: {0}")]
    InvalidFileKind(String),

    #[error("Merging requires at least two documents (have {0})")]
    InsufficientInputs(usize),

    #[error("Index {index} is out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid page range: {0}")]
    InvalidRange(String),

    #[error("Pages per file must be at least 1 (got {0})")]
    InvalidChunkSize(u32),

    #[error("No document uploaded")]
    MissingDocument,

    #[error("No extracted text available")]
    NoTextAvailable,

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Document operation failed: {0}")]
    OperationError(String),
}
