//! Error types for the PDF assembly pipeline.

use thiserror::Error;

/// Errors surfaced by the document, page, and font-subsetting components.
///
/// Every variant aborts the whole build; there is no partial-PDF recovery.
#[derive(Error, Debug)]
pub enum RendererError {
    #[error("cannot render PdfValue of this shape: {0}")]
    EncodingError(String),

    #[error("font '{0}' ran out of CIDs (counter exceeded 65535)")]
    CapacityError(String),

    #[error("unsupported page item: {0}")]
    UnsupportedContent(String),

    #[error("object graph accessed before it was populated: {0}")]
    MissingObject(String),

    #[error("font '{0}': {1}")]
    FontError(String, String),
}

pub type RendererResult<T> = Result<T, RendererError>;
