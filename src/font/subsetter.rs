//! CID allocation and the six-object font embedding this crate wires into
//! every document that references a TrueType font.

use std::collections::{BTreeMap, HashMap};

use ttf_parser::Face;

use crate::compress::maybe_deflate;
use crate::error::{RendererError, RendererResult};
use crate::object::ObjectGraph;
use crate::settings::PDFSettings;
use crate::value::{Dictionary, PdfValue};

use super::{sanitize_base_font_name, FontTables};

/// Content-stream delimiters/escapes a CID's big-endian bytes must avoid so
/// that `Tj` literal strings never need escaping.
const FORBIDDEN_CID_BYTES: [u8; 13] = [10, 13, 37, 40, 41, 47, 60, 62, 91, 92, 93, 123, 125];

#[derive(Debug, Clone, Copy)]
struct CidInfo {
    width: i64,
    codepoint: u32,
    glyph_id: u16,
}

/// Per-font state: the raw TrueType program, derived metrics, the
/// codepoint→CID table, and the object numbers allocated for its six PDF
/// objects once the graph-build phase runs.
pub struct FontSubsetter {
    name: String,
    data: Vec<u8>,
    tables: FontTables,
    codepoint_to_cid: HashMap<u32, u16>,
    cid_info: BTreeMap<u16, CidInfo>,
    cid_counter: u16,
    wrapper: Option<u32>,
    descendant: Option<u32>,
    descriptor: Option<u32>,
    font_file: Option<u32>,
    cid_to_gid: Option<u32>,
    to_unicode: Option<u32>,
}

impl FontSubsetter {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> RendererResult<Self> {
        let name = name.into();
        let tables = {
            let face = parse_face(&name, &data)?;
            FontTables::from_face(&face, &name)?
        };
        let mut cid_info = BTreeMap::new();
        cid_info.insert(
            0u16,
            CidInfo {
                width: tables.missing_width,
                codepoint: 0xFFFD,
                glyph_id: 0,
            },
        );
        Ok(Self {
            name,
            data,
            tables,
            codepoint_to_cid: HashMap::new(),
            cid_info,
            cid_counter: 0,
            wrapper: None,
            descendant: None,
            descriptor: None,
            font_file: None,
            cid_to_gid: None,
            to_unicode: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The wrapper (Type0) object's reference, once allocated — what a
    /// page's `/Font` resource entry should point at.
    pub fn wrapper_ref(&self) -> Option<u32> {
        self.wrapper
    }

    /// Encodes `text` as a big-endian CID byte string. Returns `Ok(None)`
    /// if the text contains CR, LF, or TAB — those are never encoded into
    /// content streams; the caller's DTO already splits runs around them.
    pub fn encode(&mut self, text: &str) -> RendererResult<Option<Vec<u8>>> {
        if text.chars().any(|c| c == '\r' || c == '\n' || c == '\t') {
            return Ok(None);
        }
        let mut bytes = Vec::with_capacity(text.chars().count() * 2);
        for ch in text.chars() {
            let cid = self.cid_for(ch)?;
            bytes.extend_from_slice(&cid.to_be_bytes());
        }
        Ok(Some(bytes))
    }

    fn cid_for(&mut self, ch: char) -> RendererResult<u16> {
        let codepoint = ch as u32;
        if let Some(&cid) = self.codepoint_to_cid.get(&codepoint) {
            return Ok(cid);
        }
        let face = parse_face(&self.name, &self.data)?;
        let glyph = face.glyph_index(ch).filter(|g| g.0 != 0);
        let cid = match glyph {
            Some(gid) => {
                let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                drop(face);
                let cid = self.increase_cid()?;
                let width = (advance as f64 * self.tables.scale + 0.001).round() as i64;
                self.cid_info.insert(
                    cid,
                    CidInfo {
                        width,
                        codepoint,
                        glyph_id: gid.0,
                    },
                );
                cid
            }
            None => {
                log::warn!("font '{}': codepoint U+{:04X} has no glyph, falling back to .notdef", self.name, codepoint);
                0
            }
        };
        self.codepoint_to_cid.insert(codepoint, cid);
        Ok(cid)
    }

    /// Advance the CID counter, skipping any value whose big-endian bytes
    /// collide with a content-stream delimiter.
    fn increase_cid(&mut self) -> RendererResult<u16> {
        loop {
            let next = self.cid_counter as u32 + 1;
            if next > 65535 {
                return Err(RendererError::CapacityError(self.name.clone()));
            }
            self.cid_counter = next as u16;
            let [hi, lo] = self.cid_counter.to_be_bytes();
            if FORBIDDEN_CID_BYTES.contains(&hi) || FORBIDDEN_CID_BYTES.contains(&lo) {
                continue;
            }
            return Ok(self.cid_counter);
        }
    }

    /// Graph-build phase: allocate the six PdfObjects this font needs.
    /// Order matches the wrapper/descendant/descriptor/font-file/
    /// cid-to-gid/to-unicode listing used throughout.
    pub fn generate_pdf_obj(&mut self, graph: &mut ObjectGraph) {
        self.wrapper = Some(graph.new_object(Some("Font")));
        self.descendant = Some(graph.new_object(Some("Font")));
        self.descriptor = Some(graph.new_object(Some("FontDescriptor")));
        self.font_file = Some(graph.new_object(None));
        self.cid_to_gid = Some(graph.new_object(None));
        self.to_unicode = Some(graph.new_object(None));
        log::debug!("font '{}': {} CIDs allocated, 6 objects reserved", self.name, self.cid_info.len());
    }

    /// Font-build phase: subset the TrueType program to the glyphs this
    /// font actually used and fill in all six objects' attributes/streams.
    pub fn build(&mut self, graph: &mut ObjectGraph, settings: &PDFSettings) -> RendererResult<()> {
        let wrapper = self.require(self.wrapper, "wrapper")?;
        let descendant = self.require(self.descendant, "descendant")?;
        let descriptor = self.require(self.descriptor, "descriptor")?;
        let font_file = self.require(self.font_file, "font file")?;
        let cid_to_gid = self.require(self.cid_to_gid, "CIDToGIDMap")?;
        let to_unicode = self.require(self.to_unicode, "ToUnicode")?;

        let base_font = format!("MPDFAA+{}", sanitize_base_font_name(&self.tables.full_name));

        let mut glyph_ids: Vec<u16> = self.cid_info.values().map(|info| info.glyph_id).collect();
        glyph_ids.sort_unstable();
        glyph_ids.dedup();
        let profile = subsetter::Profile::pdf(&glyph_ids);
        let subset = subsetter::subset(&self.data, 0, profile)
            .map_err(|e| RendererError::FontError(self.name.clone(), format!("subsetting failed: {e:?}")))?;

        let uncompressed_len = subset.len() as i64;
        let font_file_payload = maybe_deflate(subset, settings.compression);
        let font_file_obj = graph.object_mut(font_file);
        font_file_obj.set("Length1", PdfValue::Int(uncompressed_len));
        if settings.compression {
            font_file_obj.set("Filter", PdfValue::name("FlateDecode"));
        }
        font_file_obj.set_stream(font_file_payload);

        let cid_to_gid_bytes = self.build_cid_to_gid_map();
        let cid_to_gid_payload = maybe_deflate(cid_to_gid_bytes, settings.compression);
        let cid_to_gid_obj = graph.object_mut(cid_to_gid);
        if settings.compression {
            cid_to_gid_obj.set("Filter", PdfValue::name("FlateDecode"));
        }
        cid_to_gid_obj.set_stream(cid_to_gid_payload);

        let cmap_bytes = self.build_to_unicode_cmap();
        let cmap_payload = maybe_deflate(cmap_bytes, settings.compression);
        let to_unicode_obj = graph.object_mut(to_unicode);
        if settings.compression {
            to_unicode_obj.set("Filter", PdfValue::name("FlateDecode"));
        }
        to_unicode_obj.set_stream(cmap_payload);

        let descriptor_obj = graph.object_mut(descriptor);
        descriptor_obj.set("FontName", PdfValue::name(base_font.clone()));
        descriptor_obj.set("CapHeight", PdfValue::Int(self.tables.cap_height));
        descriptor_obj.set("StemV", PdfValue::Int(self.tables.stem_v));
        descriptor_obj.set("Ascent", PdfValue::Int(self.tables.ascent));
        descriptor_obj.set("Flags", PdfValue::Int(self.tables.flags as i64));
        descriptor_obj.set("Descent", PdfValue::Int(self.tables.descent));
        descriptor_obj.set("ItalicAngle", PdfValue::Int(self.tables.italic_angle));
        descriptor_obj.set("MissingWidth", PdfValue::Int(self.tables.missing_width));
        descriptor_obj.set(
            "FontBBox",
            PdfValue::Array(self.tables.bbox.iter().map(|&v| PdfValue::Int(v)).collect()),
        );
        descriptor_obj.set("FontFile2", PdfValue::Ref(font_file));

        let mut system_info = Dictionary::new();
        system_info.set("Supplement", PdfValue::Int(0));
        system_info.set("Ordering", PdfValue::string(b"UCS".to_vec()));
        system_info.set("Registry", PdfValue::string(b"Adobe".to_vec()));

        let descendant_obj = graph.object_mut(descendant);
        descendant_obj.set("Subtype", PdfValue::name("CIDFontType2"));
        descendant_obj.set("BaseFont", PdfValue::name(base_font.clone()));
        descendant_obj.set("DW", PdfValue::Int(self.tables.missing_width));
        descendant_obj.set("CIDSystemInfo", PdfValue::Dict(system_info));
        descendant_obj.set("FontDescriptor", PdfValue::Ref(descriptor));
        descendant_obj.set("CIDToGIDMap", PdfValue::Ref(cid_to_gid));
        descendant_obj.set("W", self.build_widths_array());

        let wrapper_obj = graph.object_mut(wrapper);
        wrapper_obj.set("Subtype", PdfValue::name("Type0"));
        wrapper_obj.set("Encoding", PdfValue::name("Identity-H"));
        wrapper_obj.set("BaseFont", PdfValue::name(base_font));
        wrapper_obj.set("DescendantFonts", PdfValue::Array(vec![PdfValue::Ref(descendant)]));
        wrapper_obj.set("ToUnicode", PdfValue::Ref(to_unicode));

        Ok(())
    }

    fn require(&self, slot: Option<u32>, what: &str) -> RendererResult<u32> {
        slot.ok_or_else(|| RendererError::MissingObject(format!("font '{}' {what} object", self.name)))
    }

    fn build_widths_array(&self) -> PdfValue {
        let mut items = Vec::with_capacity(self.cid_info.len() * 3);
        for (&cid, info) in &self.cid_info {
            items.push(PdfValue::Int(cid as i64));
            items.push(PdfValue::Int(cid as i64));
            items.push(PdfValue::Int(info.width));
        }
        PdfValue::Array(items)
    }

    fn build_cid_to_gid_map(&self) -> Vec<u8> {
        let mut map = vec![0u8; 131_072];
        for (&cid, info) in &self.cid_info {
            let offset = cid as usize * 2;
            let [hi, lo] = info.glyph_id.to_be_bytes();
            map[offset] = hi;
            map[offset + 1] = lo;
        }
        map
    }

    fn build_to_unicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo\n<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        cmap.push_str("/CMapName /Adobe-Identity-UCS def\n");
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");
        cmap.push_str(&format!("{} beginbfchar\n", self.cid_info.len()));
        for (&cid, info) in &self.cid_info {
            cmap.push_str(&format!("<{cid:04X}> <{:04X}>\n", info.codepoint));
        }
        cmap.push_str("endbfchar\n");
        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");
        cmap.into_bytes()
    }
}

fn parse_face<'a>(name: &str, data: &'a [u8]) -> RendererResult<Face<'a>> {
    Face::parse(data, 0).map_err(|e| RendererError::FontError(name.to_string(), format!("failed to parse TrueType data: {e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subsetter_for(cid_counter: u16) -> FontSubsetter {
        FontSubsetter {
            name: "test".to_string(),
            data: Vec::new(),
            tables: FontTables {
                scale: 1.0,
                ascent: 0,
                descent: 0,
                cap_height: 0,
                missing_width: 0,
                italic_angle: 0,
                stem_v: 0,
                bbox: [0, 0, 0, 0],
                flags: 0,
                full_name: "Test".to_string(),
                is_fixed_pitch: false,
            },
            codepoint_to_cid: HashMap::new(),
            cid_info: BTreeMap::new(),
            cid_counter,
            wrapper: None,
            descendant: None,
            descriptor: None,
            font_file: None,
            cid_to_gid: None,
            to_unicode: None,
        }
    }

    #[test]
    fn increase_cid_skips_forbidden_bytes() {
        let mut subsetter = subsetter_for(9);
        assert_eq!(subsetter.increase_cid().unwrap(), 11);
        let mut subsetter = subsetter_for(39);
        assert_eq!(subsetter.increase_cid().unwrap(), 42);
    }

    #[test]
    fn increase_cid_fails_past_capacity() {
        let mut subsetter = subsetter_for(65535);
        assert!(matches!(subsetter.increase_cid(), Err(RendererError::CapacityError(_))));
    }

    #[test]
    fn cid_to_gid_map_is_full_size() {
        let subsetter = subsetter_for(0);
        assert_eq!(subsetter.build_cid_to_gid_map().len(), 131_072);
    }

    #[test]
    fn widths_array_is_flat_triples() {
        let mut subsetter = subsetter_for(0);
        subsetter.cid_info.insert(0, CidInfo { width: 0, codepoint: 0xFFFD, glyph_id: 0 });
        subsetter.cid_info.insert(1, CidInfo { width: 600, codepoint: 'A' as u32, glyph_id: 5 });
        match subsetter.build_widths_array() {
            PdfValue::Array(items) => assert_eq!(items.len(), 6),
            other => panic!("expected array, got {other:?}"),
        }
    }
}
