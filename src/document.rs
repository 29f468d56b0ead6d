//! Document assembler: the single public `emit()` pipeline that turns a
//! parsed DTO into a complete PDF byte buffer.

use std::collections::HashMap;

use crate::dto;
use crate::error::RendererResult;
use crate::font::subsetter::FontSubsetter;
use crate::object::ObjectGraph;
use crate::page::Page;
use crate::settings::{format_pdf_date, DocumentInfo, PDFSettings};
use crate::value::PdfValue;

pub struct Document {
    graph: ObjectGraph,
    fonts: HashMap<String, FontSubsetter>,
    font_order: Vec<String>,
    pages: Vec<Page>,
    settings: PDFSettings,
    info: DocumentInfo,
}

impl Document {
    pub fn new(document: dto::Document, settings: PDFSettings, info: DocumentInfo) -> RendererResult<Self> {
        let mut fonts = HashMap::with_capacity(document.fonts.len());
        let mut font_order = Vec::with_capacity(document.fonts.len());
        for font in document.fonts {
            let subsetter = FontSubsetter::new(font.name.clone(), font.raw_data)?;
            font_order.push(font.name.clone());
            fonts.insert(font.name, subsetter);
        }

        let pages = document
            .pages
            .into_iter()
            .map(|page| Page::new(page.width, page.height, page.contents))
            .collect();

        Ok(Self {
            graph: ObjectGraph::new(),
            fonts,
            font_order,
            pages,
            settings,
            info,
        })
    }

    /// Runs the full build pipeline and returns the serialized PDF bytes.
    ///
    /// Phase order is load-bearing: font subsetting needs the closed set of
    /// used code points, and content-stream emission needs CIDs but not the
    /// subsetted programs themselves.
    pub fn emit(mut self) -> RendererResult<Vec<u8>> {
        for page in &self.pages {
            page.pre_scan(&mut self.fonts)?;
        }
        log::debug!("pre-scan complete: {} page(s), {} font(s)", self.pages.len(), self.fonts.len());

        for page in &mut self.pages {
            page.generate_pdf_obj(&mut self.graph);
        }
        for name in &self.font_order {
            if let Some(subsetter) = self.fonts.get_mut(name) {
                subsetter.generate_pdf_obj(&mut self.graph);
            }
        }

        let pages_tree = self.graph.pages();
        for page in &mut self.pages {
            page.build(&mut self.graph, &mut self.fonts, pages_tree, &self.settings)?;
            if let Some(page_ref) = page.page_ref() {
                self.graph.object_mut(pages_tree).add("Kids", PdfValue::Ref(page_ref));
            }
        }
        self.graph.object_mut(pages_tree).set("Count", PdfValue::Int(self.pages.len() as i64));

        for name in &self.font_order {
            if let Some(subsetter) = self.fonts.get_mut(name) {
                subsetter.build(&mut self.graph, &self.settings)?;
                log::debug!("font '{}' built", subsetter.name());
            }
        }

        let info_ref = self.write_info();

        self.graph.serialize(self.settings.decimal_precision, info_ref)
    }

    fn write_info(&mut self) -> Option<u32> {
        if self.info.is_empty() {
            return None;
        }
        let info_ref = self.graph.new_object(None);
        let object = self.graph.object_mut(info_ref);
        if let Some(title) = self.info.title.clone() {
            object.set("Title", PdfValue::string(title.into_bytes()));
        }
        if let Some(subject) = self.info.subject.clone() {
            object.set("Subject", PdfValue::string(subject.into_bytes()));
        }
        if let Some(creation_date) = self.info.creation_date {
            object.set("CreationDate", PdfValue::string(format_pdf_date(creation_date).into_bytes()));
        }
        if let Some(mod_date) = self.info.mod_date {
            object.set("ModDate", PdfValue::string(format_pdf_date(mod_date).into_bytes()));
        }
        if let Some(author) = self.info.author.clone() {
            object.set("Author", PdfValue::string(author.into_bytes()));
        }
        if let Some(creator) = self.info.creator.clone() {
            object.set("Creator", PdfValue::string(creator.into_bytes()));
        }
        if let Some(producer) = self.info.producer.clone() {
            object.set("Producer", PdfValue::string(producer.into_bytes()));
        }
        if let Some(keywords) = self.info.keywords.clone() {
            object.set("Keywords", PdfValue::string(keywords.into_bytes()));
        }
        Some(info_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_dto() -> dto::Document {
        dto::Document { fonts: Vec::new(), pages: Vec::new() }
    }

    #[test]
    fn empty_document_has_catalog_and_pages_only() {
        let document = Document::new(empty_dto(), PDFSettings::default(), DocumentInfo::default()).unwrap();
        let bytes = document.emit().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF-1.3\n"));
        assert!(text.contains("1 0 obj"));
        assert!(text.contains("2 0 obj"));
        assert!(text.contains("/Count 0"));
        assert!(!text.contains("/Kids"));
        assert!(bytes.ends_with(b"%%EOF"));
        assert!(text.contains("xref\n0 3\n"));
    }

    #[test]
    fn no_info_object_when_metadata_empty() {
        let document = Document::new(empty_dto(), PDFSettings::default(), DocumentInfo::default()).unwrap();
        let bytes = document.emit().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("/Info"));
    }

    #[test]
    fn info_object_emitted_when_title_set() {
        let mut info = DocumentInfo::default();
        info.title = Some("Report".to_string());
        let document = Document::new(empty_dto(), PDFSettings::default(), info).unwrap();
        let bytes = document.emit().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Report)"));
        assert!(text.contains("/Info 3 0 R"));
    }
}
