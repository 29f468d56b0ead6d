//! Translates DTO shapes (rounded rectangles, ellipses, arcs) into
//! content-stream path operators.
//!
//! All four rounded-rectangle corners use a single Bézier control-point
//! constant. Earlier drafts of this code used 0.553 for one corner and
//! 0.533 for the rest; that split reads as a transcription slip rather
//! than an intentional per-corner difference, so it's normalized here.

use crate::content::ContentStream;

pub const ARC_MAGIC: f64 = 0.5523;

/// Corner radii in points, in `[top_left, top_right, bottom_right,
/// bottom_left]` order, all already in PDF (bottom-left-origin) space.
pub fn rounded_rectangle(
    cs: &mut ContentStream,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    radii: [f64; 4],
    style: &str,
    precision: u32,
) {
    let [tl, tr, br, bl] = radii;
    let k = ARC_MAGIC;

    cs.move_to(x + bl, y, precision);

    cs.line_to(x + width - br, y, precision);
    if br > 0.0 {
        cs.curve_to(x + width - br + br * k, y, x + width, y + br - br * k, x + width, y + br, precision);
    }

    cs.line_to(x + width, y + height - tr, precision);
    if tr > 0.0 {
        cs.curve_to(
            x + width,
            y + height - tr + tr * k,
            x + width - tr + tr * k,
            y + height,
            x + width - tr,
            y + height,
            precision,
        );
    }

    cs.line_to(x + tl, y + height, precision);
    if tl > 0.0 {
        cs.curve_to(x + tl - tl * k, y + height, x, y + height - tl + tl * k, x, y + height - tl, precision);
    }

    cs.line_to(x, y + bl, precision);
    if bl > 0.0 {
        cs.curve_to(x, y + bl - bl * k, x + bl - bl * k, y, x + bl, y, precision);
    }

    cs.close_path();
    paint(cs, style);
}

/// Four-curve Bézier approximation of an axis-aligned ellipse.
pub fn ellipse(cs: &mut ContentStream, cx: f64, cy: f64, rx: f64, ry: f64, style: &str, precision: u32) {
    let k = ARC_MAGIC;
    cs.move_to(cx + rx, cy, precision);
    cs.curve_to(cx + rx, cy + ry * k, cx + rx * k, cy + ry, cx, cy + ry, precision);
    cs.curve_to(cx - rx * k, cy + ry, cx - rx, cy + ry * k, cx - rx, cy, precision);
    cs.curve_to(cx - rx, cy - ry * k, cx - rx * k, cy - ry, cx, cy - ry, precision);
    cs.curve_to(cx + rx * k, cy - ry, cx + rx, cy - ry * k, cx + rx, cy, precision);
    cs.close_path();
    paint(cs, style);
}

/// A circular arc from `start_deg` to `end_deg`, subdivided into ≤90°
/// segments so each Bézier stays within the usual error tolerance.
pub fn arc(cs: &mut ContentStream, cx: f64, cy: f64, radius: f64, start_deg: f64, end_deg: f64, style: &str, precision: u32) {
    let mut current = start_deg;
    let mut first = true;
    while current < end_deg - 1e-9 {
        let segment_end = (current + 90.0).min(end_deg);
        let start_rad = current.to_radians();
        let end_rad = segment_end.to_radians();

        let (sx, sy) = (cx + radius * start_rad.cos(), cy + radius * start_rad.sin());
        if first {
            cs.move_to(sx, sy, precision);
            first = false;
        }

        let sweep = end_rad - start_rad;
        let k = (4.0 / 3.0) * (sweep / 4.0).tan();
        let (ex, ey) = (cx + radius * end_rad.cos(), cy + radius * end_rad.sin());
        let c1x = sx - k * radius * start_rad.sin();
        let c1y = sy + k * radius * start_rad.cos();
        let c2x = ex + k * radius * end_rad.sin();
        let c2y = ey - k * radius * end_rad.cos();
        cs.curve_to(c1x, c1y, c2x, c2y, ex, ey, precision);

        current = segment_end;
    }
    paint(cs, style);
}

fn paint(cs: &mut ContentStream, style: &str) {
    match style {
        "f" => cs.fill(),
        "S" => cs.stroke(),
        "B" => cs.fill_and_stroke(),
        _ => cs.end_path_no_paint(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(bytes: &[u8], needle: &str) -> usize {
        let text = String::from_utf8_lossy(bytes);
        text.matches(needle).count()
    }

    #[test]
    fn fully_rounded_rectangle_has_four_arcs_and_one_close() {
        let mut cs = ContentStream::new();
        rounded_rectangle(&mut cs, 0.0, 0.0, 100.0, 50.0, [25.0, 25.0, 25.0, 25.0], "f", 2);
        let bytes = cs.bytes();
        assert_eq!(count(bytes, " c"), 4);
        assert_eq!(count(bytes, " h"), 1);
        assert!(bytes.ends_with(b"f\n"));
    }

    #[test]
    fn ellipse_has_four_curves() {
        let mut cs = ContentStream::new();
        ellipse(&mut cs, 50.0, 50.0, 20.0, 10.0, "S", 2);
        assert_eq!(count(cs.bytes(), " c"), 4);
    }

    #[test]
    fn quarter_circle_arc_is_one_segment() {
        let mut cs = ContentStream::new();
        arc(&mut cs, 0.0, 0.0, 10.0, 0.0, 90.0, "", 2);
        assert_eq!(count(cs.bytes(), " c"), 1);
        assert!(cs.bytes().ends_with(b"n\n"));
    }

    #[test]
    fn half_circle_arc_splits_into_two_segments() {
        let mut cs = ContentStream::new();
        arc(&mut cs, 0.0, 0.0, 10.0, 0.0, 180.0, "", 2);
        assert_eq!(count(cs.bytes(), " c"), 2);
    }
}
