//! TrueType table inspection and the derived PDF font metrics.

pub mod subsetter;

use ttf_parser::{Face, GlyphId};

use crate::error::{RendererError, RendererResult};

/// Metrics and descriptor fields derived once from a parsed TrueType face,
/// scaled to PDF's 1000-units-per-em convention.
#[derive(Debug, Clone)]
pub struct FontTables {
    pub scale: f64,
    pub ascent: i64,
    pub descent: i64,
    pub cap_height: i64,
    pub missing_width: i64,
    pub italic_angle: i64,
    pub stem_v: i64,
    pub bbox: [i64; 4],
    pub flags: u32,
    pub full_name: String,
    pub is_fixed_pitch: bool,
}

impl FontTables {
    pub fn from_face(face: &Face, font_name_hint: &str) -> RendererResult<Self> {
        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err(RendererError::FontError(
                font_name_hint.to_string(),
                "units_per_em is zero".to_string(),
            ));
        }
        let scale = 1000.0 / units_per_em as f64;

        let ascent = (face.ascender() as f64 * scale).round() as i64;
        let descent = (face.descender() as f64 * scale).round() as i64;
        let cap_height = face
            .capital_height()
            .map(|h| (h as f64 * scale).round() as i64)
            .unwrap_or(ascent);

        let notdef_advance = face.glyph_hor_advance(GlyphId(0)).unwrap_or(0);
        let missing_width = (notdef_advance as f64 * scale + 0.001).round() as i64;

        let italic_angle = face.italic_angle().unwrap_or(0.0).floor() as i64;
        let weight_class = face.weight().to_number();
        let stem_v = (50.0 + (weight_class as f64 / 65.0).powi(2)).round() as i64;

        let raw_bbox = face.global_bounding_box();
        let bbox = [
            (raw_bbox.x_min as f64 * scale).round() as i64,
            (raw_bbox.y_min as f64 * scale).round() as i64,
            (raw_bbox.x_max as f64 * scale).round() as i64,
            (raw_bbox.y_max as f64 * scale).round() as i64,
        ];

        let is_fixed_pitch = face.is_monospaced();
        let mut flags: u32 = 0x04; // Symbolic, always set
        if is_fixed_pitch {
            flags |= 0x01;
        }
        if italic_angle != 0 {
            flags |= 0x40;
        }
        if weight_class >= 600 {
            flags |= 0x40000;
        }

        let full_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::FULL_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_else(|| font_name_hint.to_string());

        Ok(Self {
            scale,
            ascent,
            descent,
            cap_height,
            missing_width,
            italic_angle,
            stem_v,
            bbox,
            flags,
            full_name,
            is_fixed_pitch,
        })
    }
}

/// Strips spaces and parentheses from a font's full name, for the
/// `MPDFAA+<name>` BaseFont convention.
pub fn sanitize_base_font_name(full_name: &str) -> String {
    full_name.chars().filter(|c| !c.is_whitespace() && *c != '(' && *c != ')').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_spaces_and_parens() {
        assert_eq!(sanitize_base_font_name("DejaVu Sans (Book)"), "DejaVuSansBook");
    }
}
