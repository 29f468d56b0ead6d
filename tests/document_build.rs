//! Whole-document build scenarios that don't require a real TrueType font
//! fixture. Font-subsetting specific invariants (CID allocation, forbidden
//! byte skipping, CIDToGIDMap sizing) are exercised at the unit level in
//! `src/font/subsetter.rs`, since a byte-correct TrueType fixture can't be
//! hand-authored as a literal without a toolchain to validate it against.

use pdfcraft::dto::{Color, Document, Page, PageItem};
use pdfcraft::{build_pdf, DocumentInfo, PDFSettings};

fn rectangle_page(width: f64, height: f64) -> Page {
    Page {
        width,
        height,
        contents: vec![PageItem::Rectangle {
            x: 10.0,
            y: 10.0,
            width: 100.0,
            height: 50.0,
            color: Color { r: 200, g: 20, b: 20 },
            style: "f".to_string(),
            corner_radius_pct: [0.0, 0.0, 0.0, 0.0],
        }],
    }
}

#[test]
fn empty_document_produces_minimal_valid_shell() {
    let document = Document { fonts: Vec::new(), pages: Vec::new() };
    let bytes = build_pdf(document, PDFSettings::default(), DocumentInfo::default()).unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(bytes.starts_with(b"%PDF-1.3\n%\xE2\xE3\xCF\xD3\n"));
    assert!(bytes.ends_with(b"%%EOF"));
    assert!(text.contains("1 0 obj"));
    assert!(text.contains("/Type /Catalog"));
    assert!(text.contains("2 0 obj"));
    assert!(text.contains("/Type /Pages"));
    assert!(text.contains("/Count 0"));
    assert!(!text.contains("/Kids"));
    assert!(text.contains("xref\n0 3\n"));
}

#[test]
fn multi_page_document_wires_kids_and_count() {
    let document = Document {
        fonts: Vec::new(),
        pages: vec![rectangle_page(200.0, 200.0), rectangle_page(300.0, 300.0)],
    };
    let bytes = build_pdf(document, PDFSettings::default(), DocumentInfo::default()).unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(text.contains("/Count 2"));
    // pages tree is object 2; each page allocates 3 objects (page/resources/contents)
    // in generate_pdf_obj order, so the first page is 3 and the second is 6.
    assert!(text.contains("/Kids [3 0 R 6 0 R]"));
    assert!(text.matches("/Type /Page").count() >= 2);
}

#[test]
fn rectangle_content_stream_has_path_construction_and_fill() {
    let document = Document { fonts: Vec::new(), pages: vec![rectangle_page(200.0, 200.0)] };
    let settings = PDFSettings { compression: false, decimal_precision: 4 };
    let bytes = build_pdf(document, settings, DocumentInfo::default()).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains(" m "));
    assert!(text.contains(" h "));
}

#[test]
fn compression_toggle_changes_stream_bytes_but_not_object_count() {
    let compressed_doc = Document { fonts: Vec::new(), pages: vec![rectangle_page(200.0, 200.0)] };
    let uncompressed_doc = Document { fonts: Vec::new(), pages: vec![rectangle_page(200.0, 200.0)] };

    let compressed = build_pdf(
        compressed_doc,
        PDFSettings { compression: true, decimal_precision: 4 },
        DocumentInfo::default(),
    )
    .unwrap();
    let uncompressed = build_pdf(
        uncompressed_doc,
        PDFSettings { compression: false, decimal_precision: 4 },
        DocumentInfo::default(),
    )
    .unwrap();

    let compressed_text = String::from_utf8_lossy(&compressed);
    let uncompressed_text = String::from_utf8_lossy(&uncompressed);

    assert!(compressed_text.contains("/Filter /FlateDecode"));
    assert!(!uncompressed_text.contains("/Filter /FlateDecode"));
    assert_eq!(compressed_text.matches(" 0 obj").count(), uncompressed_text.matches(" 0 obj").count());
}

#[test]
fn zero_page_document_is_still_a_parseable_shell_with_info() {
    let mut info = DocumentInfo::default();
    info.author = Some("Automated Test Suite".to_string());
    let document = Document { fonts: Vec::new(), pages: Vec::new() };
    let bytes = build_pdf(document, PDFSettings::default(), info).unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Author (Automated Test Suite)"));
    assert!(text.contains("/Info 3 0 R"));
}

#[test]
fn unsupported_font_reference_is_a_missing_object_error() {
    let document = Document {
        fonts: Vec::new(),
        pages: vec![Page {
            width: 200.0,
            height: 200.0,
            contents: vec![PageItem::TextBox {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 20.0,
                fragments: vec![pdfcraft::dto::Fragment {
                    x: 10.0,
                    baseline: 15.0,
                    chars: "hi".to_string(),
                    font_name: "NoSuchFont".to_string(),
                    font_size: 12.0,
                    font_color: Color { r: 0, g: 0, b: 0 },
                }],
            }],
        }],
    };
    let result = build_pdf(document, PDFSettings::default(), DocumentInfo::default());
    assert!(matches!(result, Err(pdfcraft::RendererError::MissingObject(_))));
}
