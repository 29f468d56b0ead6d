//! Page assembler: walks a page's DTO content list, emits its content
//! stream, and wires its PdfObjects into the pages tree.

use std::collections::HashMap;

use crate::compress::maybe_deflate;
use crate::content::ContentStream;
use crate::dto::{self, PageItem};
use crate::error::{RendererError, RendererResult};
use crate::font::subsetter::FontSubsetter;
use crate::geometry::{calc_y, Color};
use crate::object::ObjectGraph;
use crate::settings::PDFSettings;
use crate::value::{Dictionary, PdfValue};

pub struct Page {
    width: f64,
    height: f64,
    items: Vec<PageItem>,
    stream: ContentStream,
    page_obj: Option<u32>,
    resources_obj: Option<u32>,
    contents_obj: Option<u32>,
    font_aliases: Vec<(String, String)>,
    last_state: Option<(String, f64, dto::Color)>,
}

impl Page {
    pub fn new(width: f64, height: f64, items: Vec<PageItem>) -> Self {
        Self {
            width,
            height,
            items,
            stream: ContentStream::new(),
            page_obj: None,
            resources_obj: None,
            contents_obj: None,
            font_aliases: Vec::new(),
            last_state: None,
        }
    }

    /// Pre-scan phase: register every fragment's text with its font so CID
    /// tables are closed before any font is subsetted.
    pub fn pre_scan(&self, fonts: &mut HashMap<String, FontSubsetter>) -> RendererResult<()> {
        for item in &self.items {
            Self::pre_scan_item(item, fonts)?;
        }
        Ok(())
    }

    fn pre_scan_item(item: &PageItem, fonts: &mut HashMap<String, FontSubsetter>) -> RendererResult<()> {
        match item {
            PageItem::TextArea { paragraphs, .. } => {
                for paragraph in paragraphs {
                    for line in &paragraph.textlines {
                        for word in &line.words {
                            for fragment in &word.fragments {
                                Self::pre_scan_fragment(fragment, fonts)?;
                            }
                        }
                    }
                }
                Ok(())
            }
            PageItem::TextBox { fragments, .. } => {
                for fragment in fragments {
                    Self::pre_scan_fragment(fragment, fonts)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn pre_scan_fragment(fragment: &dto::Fragment, fonts: &mut HashMap<String, FontSubsetter>) -> RendererResult<()> {
        let subsetter = fonts
            .get_mut(&fragment.font_name)
            .ok_or_else(|| RendererError::MissingObject(format!("font '{}' not registered", fragment.font_name)))?;
        subsetter.encode(&fragment.chars)?;
        Ok(())
    }

    /// Graph-build phase: allocate this page's three objects.
    pub fn generate_pdf_obj(&mut self, graph: &mut ObjectGraph) {
        self.page_obj = Some(graph.new_object(Some("Page")));
        self.resources_obj = Some(graph.new_object(None));
        self.contents_obj = Some(graph.new_object(None));
    }

    pub fn page_ref(&self) -> Option<u32> {
        self.page_obj
    }

    /// Page-build phase: emit the content stream and wire every attribute.
    pub fn build(
        &mut self,
        graph: &mut ObjectGraph,
        fonts: &mut HashMap<String, FontSubsetter>,
        pages_tree: u32,
        settings: &PDFSettings,
    ) -> RendererResult<()> {
        let page_obj = self.require(self.page_obj, "page")?;
        let resources_obj = self.require(self.resources_obj, "resources")?;
        let contents_obj = self.require(self.contents_obj, "contents")?;

        let items = std::mem::take(&mut self.items);
        for item in &items {
            self.draw_item(item, fonts, settings)?;
        }

        let mut font_dict = Dictionary::new();
        for (name, alias) in &self.font_aliases {
            let subsetter = fonts
                .get(name)
                .ok_or_else(|| RendererError::MissingObject(format!("font '{name}' not registered")))?;
            let wrapper = subsetter
                .wrapper_ref()
                .ok_or_else(|| RendererError::MissingObject(format!("font '{name}' wrapper object")))?;
            font_dict.set(alias.clone(), PdfValue::Ref(wrapper));
        }

        let resources = graph.object_mut(resources_obj);
        resources.set(
            "ProcSet",
            PdfValue::Array(vec![
                PdfValue::name("PDF"),
                PdfValue::name("Text"),
                PdfValue::name("ImageB"),
                PdfValue::name("ImageC"),
                PdfValue::name("ImageI"),
            ]),
        );
        resources.set("XObject", PdfValue::Dict(Dictionary::new()));
        resources.set("Font", PdfValue::Dict(font_dict));

        let content_bytes = std::mem::take(&mut self.stream).into_bytes();
        let payload = maybe_deflate(content_bytes, settings.compression);
        let contents = graph.object_mut(contents_obj);
        if settings.compression {
            contents.set("Filter", PdfValue::name("FlateDecode"));
        }
        contents.set_stream(payload);

        let page = graph.object_mut(page_obj);
        page.set(
            "MediaBox",
            PdfValue::Raw(format!("[0 0 {} {}]", fmt_point(self.width), fmt_point(self.height)).into_bytes()),
        );
        page.set("Resources", PdfValue::Ref(resources_obj));
        page.add("Contents", PdfValue::Ref(contents_obj));
        page.set("Parent", PdfValue::Ref(pages_tree));

        Ok(())
    }

    fn require(&self, slot: Option<u32>, what: &str) -> RendererResult<u32> {
        slot.ok_or_else(|| RendererError::MissingObject(format!("page {what} object")))
    }

    fn draw_item(&mut self, item: &PageItem, fonts: &mut HashMap<String, FontSubsetter>, settings: &PDFSettings) -> RendererResult<()> {
        match item {
            PageItem::TextArea { paragraphs, .. } => {
                for paragraph in paragraphs {
                    for line in &paragraph.textlines {
                        for word in &line.words {
                            for fragment in &word.fragments {
                                self.draw_fragment(fragment, fonts, settings)?;
                            }
                        }
                    }
                }
                Ok(())
            }
            PageItem::TextBox { fragments, .. } => {
                for fragment in fragments {
                    self.draw_fragment(fragment, fonts, settings)?;
                }
                Ok(())
            }
            PageItem::Curve { points, color, line_width, style } => {
                self.draw_curve(points, *color, *line_width, style, settings);
                Ok(())
            }
            PageItem::Rectangle { x, y, width, height, color, style, corner_radius_pct } => {
                self.draw_rectangle(*x, *y, *width, *height, *color, style, *corner_radius_pct, settings);
                Ok(())
            }
            PageItem::Arc { x, y, radius, start_angle, end_angle, color, style } => {
                self.draw_arc(*x, *y, *radius, *start_angle, *end_angle, *color, style, settings);
                Ok(())
            }
            PageItem::Ellipse { x, y, width, height, color, style } => {
                self.draw_ellipse(*x, *y, *width, *height, *color, style, settings);
                Ok(())
            }
        }
    }

    fn draw_fragment(&mut self, fragment: &dto::Fragment, fonts: &mut HashMap<String, FontSubsetter>, settings: &PDFSettings) -> RendererResult<()> {
        let precision = settings.decimal_precision;
        let subsetter = fonts
            .get_mut(&fragment.font_name)
            .ok_or_else(|| RendererError::MissingObject(format!("font '{}' not registered", fragment.font_name)))?;
        let Some(cid_bytes) = subsetter.encode(&fragment.chars)? else {
            return Ok(());
        };

        let alias = self.alias_for(&fragment.font_name);
        let state = (fragment.font_name.clone(), fragment.font_size, fragment.font_color);
        if self.last_state.as_ref() != Some(&state) {
            self.stream.set_font(&alias, fragment.font_size, precision);
            self.stream.set_fill_color(to_color(fragment.font_color), precision);
            self.last_state = Some(state);
        }

        let pdf_y = calc_y(self.height, fragment.baseline, 0.0);
        self.stream.show_text(fragment.x, pdf_y, &cid_bytes, precision);
        Ok(())
    }

    fn alias_for(&mut self, font_name: &str) -> String {
        if let Some((_, alias)) = self.font_aliases.iter().find(|(name, _)| name == font_name) {
            return alias.clone();
        }
        let alias = format!("F{}", self.font_aliases.len() + 1);
        self.font_aliases.push((font_name.to_string(), alias.clone()));
        alias
    }

    fn calc_y_point(&self, y: f64) -> f64 {
        calc_y(self.height, y, 0.0)
    }

    fn draw_curve(&mut self, points: &[(f64, f64)], color: dto::Color, line_width: f64, style: &str, settings: &PDFSettings) {
        if points.is_empty() {
            return;
        }
        let precision = settings.decimal_precision;
        self.stream.set_stroke_color(to_color(color), precision);
        self.stream.set_line_width(line_width, precision);

        let (sx, sy) = points[0];
        self.stream.move_to(sx, self.calc_y_point(sy), precision);

        let rest = &points[1..];
        if !rest.is_empty() && rest.len() % 3 == 0 {
            for chunk in rest.chunks(3) {
                let (c1x, c1y) = chunk[0];
                let (c2x, c2y) = chunk[1];
                let (ex, ey) = chunk[2];
                self.stream.curve_to(
                    c1x,
                    self.calc_y_point(c1y),
                    c2x,
                    self.calc_y_point(c2y),
                    ex,
                    self.calc_y_point(ey),
                    precision,
                );
            }
        } else {
            for &(px, py) in rest {
                self.stream.line_to(px, self.calc_y_point(py), precision);
            }
        }

        match style {
            "f" => self.stream.fill(),
            "B" => self.stream.fill_and_stroke(),
            _ => self.stream.stroke(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_rectangle(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: dto::Color,
        style: &str,
        corner_radius_pct: [f64; 4],
        settings: &PDFSettings,
    ) {
        let precision = settings.decimal_precision;
        self.set_shape_color(to_color(color), style, precision);

        let pdf_y = calc_y(self.height, y, height);
        let half_min = width.min(height) / 2.0;
        let radii = [
            corner_radius_pct[0] / 100.0 * half_min,
            corner_radius_pct[1] / 100.0 * half_min,
            corner_radius_pct[2] / 100.0 * half_min,
            corner_radius_pct[3] / 100.0 * half_min,
        ];
        crate::shapes::rounded_rectangle(&mut self.stream, x, pdf_y, width, height, radii, style, precision);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_arc(&mut self, x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, color: dto::Color, style: &str, settings: &PDFSettings) {
        let precision = settings.decimal_precision;
        self.set_shape_color(to_color(color), style, precision);
        let cy = self.calc_y_point(y);
        crate::shapes::arc(&mut self.stream, x, cy, radius, start_angle, end_angle, style, precision);
    }

    fn draw_ellipse(&mut self, x: f64, y: f64, width: f64, height: f64, color: dto::Color, style: &str, settings: &PDFSettings) {
        let precision = settings.decimal_precision;
        self.set_shape_color(to_color(color), style, precision);
        let cx = x + width / 2.0;
        let cy = self.calc_y_point(y + height / 2.0);
        crate::shapes::ellipse(&mut self.stream, cx, cy, width / 2.0, height / 2.0, style, precision);
    }

    fn set_shape_color(&mut self, color: Color, style: &str, precision: u32) {
        match style {
            "f" => self.stream.set_fill_color(color, precision),
            "S" => self.stream.set_stroke_color(color, precision),
            "B" => {
                self.stream.set_fill_color(color, precision);
                self.stream.set_stroke_color(color, precision);
            }
            _ => {}
        }
    }
}

fn to_color(color: dto::Color) -> Color {
    Color::new(color.r, color.g, color.b)
}

fn fmt_point(value: f64) -> String {
    crate::value::format_real(value, 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_for_reuses_existing_alias() {
        let mut page = Page::new(612.0, 792.0, Vec::new());
        assert_eq!(page.alias_for("Body"), "F1");
        assert_eq!(page.alias_for("Heading"), "F2");
        assert_eq!(page.alias_for("Body"), "F1");
    }
}
