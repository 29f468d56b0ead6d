//! Content-stream operator emission (text, paths, colors, transforms).
//!
//! Every method appends to a growing byte buffer; nothing here understands
//! page or font semantics, only PDF operator syntax.

use crate::geometry::Color;
use crate::value::format_real;

#[derive(Debug, Clone, Default)]
pub struct ContentStream {
    buffer: Vec<u8>,
    path: Vec<String>,
}

impl ContentStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn save_state(&mut self) {
        self.buffer.extend_from_slice(b"q\n");
    }

    pub fn restore_state(&mut self) {
        self.buffer.extend_from_slice(b"Q\n");
    }

    pub fn set_fill_color(&mut self, color: Color, precision: u32) {
        let (r, g, b) = color.channels();
        self.write_line(&format!(
            "{} {} {} rg",
            format_real(r, precision),
            format_real(g, precision),
            format_real(b, precision)
        ));
    }

    pub fn set_stroke_color(&mut self, color: Color, precision: u32) {
        let (r, g, b) = color.channels();
        self.write_line(&format!(
            "{} {} {} RG",
            format_real(r, precision),
            format_real(g, precision),
            format_real(b, precision)
        ));
    }

    pub fn set_line_width(&mut self, width: f64, precision: u32) {
        self.write_line(&format!("{} w", format_real(width, precision)));
    }

    pub fn set_dash(&mut self, cap: i64, join: i64, on: f64, off: f64, phase: f64, precision: u32) {
        self.write_line(&format!(
            "{} J {} j [{} {}] {} d",
            cap,
            join,
            format_real(on, precision),
            format_real(off, precision),
            format_real(phase, precision)
        ));
    }

    /// Declares the active font and size. Page assemblers only call this
    /// when the (font, size) pair actually changed.
    pub fn set_font(&mut self, alias: &str, size: f64, precision: u32) {
        self.write_line(&format!("BT /{} {} Tf ET", alias, format_real(size, precision)));
    }

    /// Draws `cid_bytes` (already big-endian CID pairs, no escaping needed
    /// since CID allocation avoids every delimiter byte) at `(x, y)`.
    pub fn show_text(&mut self, x: f64, y: f64, cid_bytes: &[u8], precision: u32) {
        self.buffer.extend_from_slice(b"BT ");
        self.buffer
            .extend_from_slice(format!("{} {} Td (", format_real(x, precision), format_real(y, precision)).as_bytes());
        self.buffer.extend_from_slice(cid_bytes);
        self.buffer.extend_from_slice(b") Tj ET\n");
    }

    pub fn move_to(&mut self, x: f64, y: f64, precision: u32) {
        self.path.push(format!("{} {} m", format_real(x, precision), format_real(y, precision)));
    }

    pub fn line_to(&mut self, x: f64, y: f64, precision: u32) {
        self.path.push(format!("{} {} l", format_real(x, precision), format_real(y, precision)));
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, precision: u32) {
        self.path.push(format!(
            "{} {} {} {} {} {} c",
            format_real(x1, precision),
            format_real(y1, precision),
            format_real(x2, precision),
            format_real(y2, precision),
            format_real(x3, precision),
            format_real(y3, precision)
        ));
    }

    pub fn close_path(&mut self) {
        self.path.push("h".to_string());
    }

    fn flush_path(&mut self) {
        if self.path.is_empty() {
            return;
        }
        self.buffer.extend_from_slice(self.path.join(" ").as_bytes());
        self.buffer.push(b' ');
        self.path.clear();
    }

    pub fn fill(&mut self) {
        self.flush_path();
        self.write_line("f");
    }

    pub fn stroke(&mut self) {
        self.flush_path();
        self.write_line("S");
    }

    pub fn fill_and_stroke(&mut self) {
        self.flush_path();
        self.write_line("B");
    }

    pub fn clip(&mut self) {
        self.flush_path();
        self.write_line("W n");
    }

    /// Ends the current path without painting it (the `n` operator).
    pub fn end_path_no_paint(&mut self) {
        self.flush_path();
        self.write_line("n");
    }

    /// `x y w h re <style>`, style one of `B`/`f`/`S`/empty.
    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64, style: &str, precision: u32) {
        let line = format!(
            "{} {} {} {} re{}",
            format_real(x, precision),
            format_real(y, precision),
            format_real(width, precision),
            format_real(height, precision),
            if style.is_empty() { String::new() } else { format!(" {style}") }
        );
        self.write_line(&line);
    }

    /// Rotate the coordinate system by `degrees` about `(x, y)`: translate
    /// to the pivot, rotate, translate back — three `cm` operators.
    pub fn rotate_about(&mut self, x: f64, y: f64, degrees: f64, precision: u32) {
        let theta = degrees.to_radians();
        let (sin, cos) = theta.sin_cos();
        self.push_cm(1.0, 0.0, 0.0, 1.0, x, y, precision);
        self.push_cm(cos, -sin, sin, cos, 0.0, 0.0, precision);
        self.push_cm(1.0, 0.0, 0.0, 1.0, -x, -y, precision);
    }

    fn push_cm(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64, precision: u32) {
        self.write_line(&format!(
            "{} {} {} {} {} {} cm",
            format_real(a, precision),
            format_real(b, precision),
            format_real(c, precision),
            format_real(d, precision),
            format_real(e, precision),
            format_real(f, precision)
        ));
    }

    fn write_line(&mut self, line: &str) {
        self.buffer.extend_from_slice(line.as_bytes());
        self.buffer.push(b'\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_restore_are_single_letters() {
        let mut cs = ContentStream::new();
        cs.save_state();
        cs.restore_state();
        assert_eq!(cs.bytes(), b"q\nQ\n");
    }

    #[test]
    fn fill_color_divides_by_255() {
        let mut cs = ContentStream::new();
        cs.set_fill_color(Color::new(255, 0, 0), 4);
        assert_eq!(cs.bytes(), b"1 0 0 rg\n");
    }

    #[test]
    fn rectangle_path_then_paint() {
        let mut cs = ContentStream::new();
        cs.rectangle(0.0, 0.0, 100.0, 50.0, "f", 2);
        assert_eq!(cs.bytes(), b"0 0 100 50 re f\n");
    }

    #[test]
    fn path_ops_are_space_joined_on_one_line() {
        let mut cs = ContentStream::new();
        cs.move_to(0.0, 0.0, 2);
        cs.line_to(10.0, 0.0, 2);
        cs.close_path();
        cs.fill();
        assert_eq!(cs.bytes(), b"0 0 m 10 0 l h f\n");
    }

    #[test]
    fn text_draw_uses_td_and_raw_bytes() {
        let mut cs = ContentStream::new();
        cs.show_text(72.0, 720.0, &[0x00, 0x01], 2);
        assert_eq!(cs.bytes(), b"BT 72 720 Td (\x00\x01) Tj ET\n");
    }

    #[test]
    fn rotate_emits_three_cm_lines() {
        let mut cs = ContentStream::new();
        cs.rotate_about(0.0, 0.0, 90.0, 2);
        let text = String::from_utf8(cs.bytes().to_vec()).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.lines().all(|l| l.ends_with("cm")));
    }
}
