//! Build-time knobs and the optional document-info metadata block.

use chrono::{DateTime, Local};

/// The whole of this crate's configuration surface: a plain struct the
/// caller constructs and passes by reference. No file or environment
/// config — the crate is a pure function of its DTO and these settings.
#[derive(Debug, Clone, Copy)]
pub struct PDFSettings {
    /// Deflate content streams, font files, and CIDToGIDMaps with
    /// `/FlateDecode` when true.
    pub compression: bool,
    /// Decimal digits kept when a `PdfValue::Real` is rendered.
    pub decimal_precision: u32,
}

impl Default for PDFSettings {
    fn default() -> Self {
        Self {
            compression: true,
            decimal_precision: 4,
        }
    }
}

/// Optional `/Info` dictionary fields. An Info object is only emitted if
/// at least one field is `Some`.
#[derive(Debug, Clone, Default)]
pub struct DocumentInfo {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub keywords: Option<String>,
    pub creation_date: Option<DateTime<Local>>,
    pub mod_date: Option<DateTime<Local>>,
}

impl DocumentInfo {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.subject.is_none()
            && self.author.is_none()
            && self.creator.is_none()
            && self.producer.is_none()
            && self.keywords.is_none()
            && self.creation_date.is_none()
            && self.mod_date.is_none()
    }
}

/// `D:YYYYMMDDHHMMSS<±HH>'<MM>'`, the PDF date-string format.
pub fn format_pdf_date(when: DateTime<Local>) -> String {
    let offset = when.format("%z").to_string(); // e.g. "+0200" or "-0530"
    let (sign, rest) = offset.split_at(1);
    let hours = &rest[0..2];
    let minutes = &rest[2..4];
    format!("D:{}{}'{}'", when.format("%Y%m%d%H%M%S"), format!("{sign}{hours}"), minutes)
}
