//! `PdfValue`: the tagged sum type for everything that can appear inside a
//! PDF object's attribute dictionary, plus the single recursive-descent
//! renderer that turns it into PDF syntax.

use crate::error::RendererResult;

/// A PDF value: scalar, structured, or a forward reference to another
/// indirect object.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Int(i64),
    Real(f64),
    /// ASCII-encoded literal string (without the surrounding parentheses).
    LiteralString(Vec<u8>),
    /// A name, without the leading `/`.
    Name(String),
    Array(Vec<PdfValue>),
    Dict(Dictionary),
    /// Pre-formatted PDF syntax, emitted byte-for-byte (e.g. `[0 0 612 792]`).
    Raw(Vec<u8>),
    /// An indirect reference to the object with this number.
    Ref(u32),
}

impl PdfValue {
    pub fn name(s: impl Into<String>) -> Self {
        PdfValue::Name(s.into())
    }

    pub fn string(s: impl Into<Vec<u8>>) -> Self {
        PdfValue::LiteralString(s.into())
    }

    pub fn array(values: impl IntoIterator<Item = PdfValue>) -> Self {
        PdfValue::Array(values.into_iter().collect())
    }
}

impl From<i64> for PdfValue {
    fn from(v: i64) -> Self {
        PdfValue::Int(v)
    }
}

impl From<i32> for PdfValue {
    fn from(v: i32) -> Self {
        PdfValue::Int(v as i64)
    }
}

impl From<u32> for PdfValue {
    fn from(v: u32) -> Self {
        PdfValue::Int(v as i64)
    }
}

impl From<f64> for PdfValue {
    fn from(v: f64) -> Self {
        PdfValue::Real(v)
    }
}

/// An ordered name → value mapping. Insertion order is preserved so
/// serialized output is byte-stable across runs.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: Vec<(String, PdfValue)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PdfValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Set (or overwrite) an attribute outright.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<PdfValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// The promotion rule used by `/Kids` and `/Contents`: the first value
    /// added under a name becomes a single-entry array; subsequent adds
    /// append to it; adding onto an existing non-array value promotes that
    /// value into a two-entry array first.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<PdfValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            None => self.entries.push((name, PdfValue::Array(vec![value]))),
            Some(slot) => {
                let previous = std::mem::replace(&mut slot.1, PdfValue::Array(Vec::new()));
                slot.1 = match previous {
                    PdfValue::Array(mut items) => {
                        items.push(value);
                        PdfValue::Array(items)
                    }
                    other => PdfValue::Array(vec![other, value]),
                };
            }
        }
    }

    pub fn write(&self, out: &mut Vec<u8>, depth: usize, precision: u32) -> RendererResult<()> {
        out.push(b'\n');
        push_tabs(out, depth - 1);
        out.extend_from_slice(b"<<");
        for (name, value) in &self.entries {
            out.push(b'\n');
            push_tabs(out, depth);
            out.push(b'/');
            out.extend_from_slice(name.as_bytes());
            out.push(b' ');
            value.write(out, depth + 1, precision)?;
        }
        out.push(b'\n');
        push_tabs(out, depth - 1);
        out.extend_from_slice(b">>");
        Ok(())
    }
}

fn push_tabs(out: &mut Vec<u8>, n: usize) {
    for _ in 0..n {
        out.push(b'\t');
    }
}

impl PdfValue {
    /// Render this value at the given dictionary-nesting `depth` (only
    /// meaningful for `Dict`; everything else ignores it except to pass it
    /// on to nested dictionaries).
    pub fn write(&self, out: &mut Vec<u8>, depth: usize, precision: u32) -> RendererResult<()> {
        match self {
            PdfValue::Int(v) => {
                out.extend_from_slice(v.to_string().as_bytes());
                Ok(())
            }
            PdfValue::Real(v) => {
                out.extend_from_slice(format_real(*v, precision).as_bytes());
                Ok(())
            }
            PdfValue::LiteralString(bytes) => {
                out.push(b'(');
                for &b in bytes {
                    if b == b'\\' || b == b'(' || b == b')' {
                        out.push(b'\\');
                    }
                    out.push(b);
                }
                out.push(b')');
                Ok(())
            }
            PdfValue::Name(name) => {
                write_name(name, out);
                Ok(())
            }
            PdfValue::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    item.write(out, depth, precision)?;
                }
                out.push(b']');
                Ok(())
            }
            PdfValue::Dict(dict) => dict.write(out, depth, precision),
            PdfValue::Raw(bytes) => {
                out.extend_from_slice(bytes);
                Ok(())
            }
            PdfValue::Ref(object_number) => {
                out.extend_from_slice(object_number.to_string().as_bytes());
                out.extend_from_slice(b" 0 R");
                Ok(())
            }
        }
    }
}

/// Format a real number to `precision` decimal digits, trimming trailing
/// zeros (and a trailing `.`) so integral reals print as `12` not `12.0000`.
pub(crate) fn format_real(value: f64, precision: u32) -> String {
    let formatted = format!("{:.*}", precision as usize, value);
    if !formatted.contains('.') {
        return formatted;
    }
    let trimmed = formatted.trim_end_matches('0');
    let trimmed = trimmed.trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn write_name(name: &str, out: &mut Vec<u8>) {
    out.push(b'/');
    for &b in name.as_bytes() {
        if is_regular_byte(b) {
            out.push(b);
        } else {
            out.push(b'#');
            out.extend_from_slice(format!("{:02X}", b).as_bytes());
        }
    }
}

/// PDF "regular" characters: everything but whitespace and delimiters.
fn is_regular_byte(b: u8) -> bool {
    !matches!(
        b,
        0x00 | 0x09 | 0x0A | 0x0C | 0x0D | 0x20 | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_is_single_space_separated() {
        let v = PdfValue::array([PdfValue::Int(1), PdfValue::Int(2), PdfValue::Int(3)]);
        let mut out = Vec::new();
        v.write(&mut out, 1, 4).unwrap();
        assert_eq!(out, b"[1 2 3]");
    }

    #[test]
    fn reference_format() {
        let v = PdfValue::Ref(7);
        let mut out = Vec::new();
        v.write(&mut out, 1, 4).unwrap();
        assert_eq!(out, b"7 0 R");
    }

    #[test]
    fn dictionary_indentation() {
        let mut dict = Dictionary::new();
        dict.set("Type", PdfValue::name("Catalog"));
        dict.set("Count", PdfValue::Int(0));
        let mut out = Vec::new();
        dict.write(&mut out, 1, 4).unwrap();
        assert_eq!(out, b"\n<<\n\t/Type /Catalog\n\t/Count 0\n>>");
    }

    #[test]
    fn add_promotes_scalar_to_array() {
        let mut dict = Dictionary::new();
        dict.add("Kids", PdfValue::Ref(3));
        assert!(matches!(dict.get("Kids"), Some(PdfValue::Array(a)) if a.len() == 1));
        dict.add("Kids", PdfValue::Ref(4));
        match dict.get("Kids").unwrap() {
            PdfValue::Array(items) => assert_eq!(items.len(), 2),
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn name_escapes_delimiters() {
        let v = PdfValue::name("My Name(1)");
        let mut out = Vec::new();
        v.write(&mut out, 1, 4).unwrap();
        assert_eq!(out, b"/My#20Name#281#29");
    }

    #[test]
    fn real_trims_trailing_zeros() {
        let mut out = Vec::new();
        PdfValue::Real(12.0).write(&mut out, 1, 4).unwrap();
        assert_eq!(out, b"12");
        out.clear();
        PdfValue::Real(1.5).write(&mut out, 1, 4).unwrap();
        assert_eq!(out, b"1.5");
    }
}
