//! PDF 1.3 document assembly with TrueType CID font subsetting.
//!
//! Converts an already-laid-out [`dto::Document`] (pages of text and
//! shapes, plus the TrueType fonts they reference) into a complete PDF
//! byte buffer. Page layout, line breaking, and word positioning all
//! happen upstream of this crate.

pub mod compress;
pub mod content;
pub mod document;
pub mod dto;
pub mod error;
pub mod font;
pub mod geometry;
pub mod object;
pub mod page;
pub mod settings;
pub mod shapes;
pub mod value;

pub use document::Document;
pub use error::{RendererError, RendererResult};
pub use settings::{DocumentInfo, PDFSettings};

/// Builds a complete PDF from a parsed document description.
pub fn build_pdf(document: dto::Document, settings: PDFSettings, info: DocumentInfo) -> RendererResult<Vec<u8>> {
    Document::new(document, settings, info)?.emit()
}
