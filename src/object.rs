//! `PdfObject` and `ObjectGraph`: the indirect-object store and the
//! byte-level serializer that turns it into a complete PDF 1.3 file.

use crate::error::RendererResult;
use crate::value::{Dictionary, PdfValue};

/// A single indirect object: number, attribute dictionary, optional stream.
///
/// Generation number is always 0 — this crate never rewrites an existing
/// object in place.
#[derive(Debug, Clone)]
pub struct PdfObject {
    number: u32,
    attributes: Dictionary,
    stream: Option<Vec<u8>>,
}

impl PdfObject {
    fn new(number: u32, type_name: Option<&str>) -> Self {
        let mut attributes = Dictionary::new();
        if let Some(type_name) = type_name {
            attributes.set("Type", PdfValue::name(type_name));
        }
        Self {
            number,
            attributes,
            stream: None,
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn reference(&self) -> PdfValue {
        PdfValue::Ref(self.number)
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PdfValue>) {
        self.attributes.set(name, value);
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<PdfValue>) {
        self.attributes.add(name, value);
    }

    pub fn attributes(&self) -> &Dictionary {
        &self.attributes
    }

    /// Replace the stream body, updating `/Length` to match.
    pub fn set_stream(&mut self, bytes: Vec<u8>) {
        self.attributes.set("Length", PdfValue::Int(bytes.len() as i64));
        self.stream = Some(bytes);
    }

    fn write(&self, out: &mut Vec<u8>, precision: u32) -> RendererResult<()> {
        out.extend_from_slice(self.number.to_string().as_bytes());
        out.extend_from_slice(b" 0 obj");
        self.attributes.write(out, 1, precision)?;
        out.push(b'\n');
        if let Some(stream) = &self.stream {
            out.extend_from_slice(b"stream\n");
            out.extend_from_slice(stream);
            if stream.last() != Some(&b'\n') {
                out.push(b'\n');
            }
            out.extend_from_slice(b"endstream\n");
        }
        out.extend_from_slice(b"endobj\n");
        Ok(())
    }
}

/// Owns every `PdfObject` for the duration of a build and serializes the
/// whole file. The catalog (object 1) and pages tree (object 2) are created
/// alongside the graph itself.
pub struct ObjectGraph {
    objects: Vec<PdfObject>,
    catalog: u32,
    pages: u32,
}

impl ObjectGraph {
    pub fn new() -> Self {
        let mut graph = Self {
            objects: Vec::new(),
            catalog: 0,
            pages: 0,
        };
        let catalog = graph.new_object(Some("Catalog"));
        let pages = graph.new_object(Some("Pages"));
        graph.object_mut(pages).set("Count", PdfValue::Int(0));
        graph.object_mut(catalog).set("Pages", PdfValue::Ref(pages));
        graph.catalog = catalog;
        graph.pages = pages;
        graph
    }

    pub fn catalog(&self) -> u32 {
        self.catalog
    }

    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Allocate the next object number. Numbers are a dense 1-based
    /// sequence matching creation order and are never reused.
    pub fn new_object(&mut self, type_name: Option<&str>) -> u32 {
        let number = self.objects.len() as u32 + 1;
        self.objects.push(PdfObject::new(number, type_name));
        number
    }

    pub fn object(&self, number: u32) -> &PdfObject {
        &self.objects[(number - 1) as usize]
    }

    pub fn object_mut(&mut self, number: u32) -> &mut PdfObject {
        &mut self.objects[(number - 1) as usize]
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Produce the complete file: header, every object at its recorded
    /// offset, the cross-reference table, and the trailer. `info` is the
    /// object number of an optional Info dictionary.
    pub fn serialize(&self, precision: u32, info: Option<u32>) -> RendererResult<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.3\n%\xE2\xE3\xCF\xD3\n");

        let mut offsets = Vec::with_capacity(self.objects.len());
        for object in &self.objects {
            offsets.push(out.len());
            object.write(&mut out, precision)?;
        }

        let xref_start = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", self.objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f\n");
        for offset in &offsets {
            out.extend_from_slice(format!("{:010} 00000 n\n", offset).as_bytes());
        }

        out.extend_from_slice(b"trailer\n<<\n\t/Root ");
        out.extend_from_slice(self.catalog.to_string().as_bytes());
        out.extend_from_slice(b" 0 R\n\t/Size ");
        out.extend_from_slice((self.objects.len() + 1).to_string().as_bytes());
        out.extend_from_slice(b"\n\t/ID [");
        out.extend_from_slice(file_id(&out).as_bytes());
        out.extend_from_slice(b"]\n");
        if let Some(info) = info {
            out.extend_from_slice(format!("\t/Info {} 0 R\n", info).as_bytes());
        }
        out.extend_from_slice(b">>\nstartxref\n");
        out.extend_from_slice(xref_start.to_string().as_bytes());
        out.extend_from_slice(b"\n%%EOF");

        Ok(out)
    }
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// MD5 (non-security use) of the bytes accumulated so far plus the current
/// local time, upper-cased hex, doubled and angle-bracket-delimited. Every
/// build of the same document therefore produces a different `/ID`.
fn file_id(accumulated: &[u8]) -> String {
    let salt = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
    let mut input = accumulated.to_vec();
    input.extend_from_slice(salt.as_bytes());
    let digest = format!("{:X}", md5::compute(&input));
    format!("<{digest}><{digest}>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_has_catalog_and_pages() {
        let graph = ObjectGraph::new();
        assert_eq!(graph.catalog(), 1);
        assert_eq!(graph.pages(), 2);
        assert_eq!(graph.object_count(), 2);
    }

    #[test]
    fn serialize_starts_with_header_and_ends_with_eof() {
        let graph = ObjectGraph::new();
        let bytes = graph.serialize(4, None).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.3\n%\xE2\xE3\xCF\xD3\n"));
        assert!(bytes.ends_with(b"%%EOF"));
    }

    #[test]
    fn xref_has_one_entry_per_object_plus_free_slot() {
        let mut graph = ObjectGraph::new();
        graph.new_object(Some("Page"));
        let bytes = graph.serialize(4, None).unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("xref\n0 4\n"));
        assert!(text.contains("0000000000 65535 f\n"));
    }

    #[test]
    fn stream_sets_length() {
        let mut graph = ObjectGraph::new();
        let content = graph.new_object(Some("XObject"));
        graph.object_mut(content).set_stream(b"abc".to_vec());
        match graph.object(content).attributes().get("Length") {
            Some(PdfValue::Int(3)) => {}
            other => panic!("unexpected Length value: {other:?}"),
        }
    }
}
