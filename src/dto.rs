//! Input data-transfer objects. The document arrives already laid out —
//! page geometry, line breaking, and word positioning happen upstream —
//! but the shapes are `serde`-derived so an embedder across a process or
//! FFI boundary can hand the crate JSON (or any other serde format).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Font {
    pub name: String,
    pub raw_data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub fonts: Vec<Font>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub contents: Vec<PageItem>,
}

/// A single run of same-styled glyphs within a word.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub x: f64,
    pub baseline: f64,
    pub chars: String,
    pub font_name: String,
    pub font_size: f64,
    pub font_color: Color,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub fragments: Vec<Fragment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Textline {
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    pub textlines: Vec<Textline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PageItem {
    /// Pre-laid-out running text: `paragraphs → textlines → words → fragments`.
    TextArea { x: f64, y: f64, width: f64, height: f64, paragraphs: Vec<Paragraph> },
    /// A flat run of fragments with no paragraph/line nesting — used for
    /// single-line labels and form-field style text that never wraps.
    TextBox { x: f64, y: f64, width: f64, height: f64, fragments: Vec<Fragment> },
    Curve { points: Vec<(f64, f64)>, color: Color, line_width: f64, style: String },
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        style: String,
        /// `[top_left, top_right, bottom_right, bottom_left]`, each 0..100.
        #[serde(default)]
        corner_radius_pct: [f64; 4],
    },
    Arc { x: f64, y: f64, radius: f64, start_angle: f64, end_angle: f64, color: Color, style: String },
    Ellipse { x: f64, y: f64, width: f64, height: f64, color: Color, style: String },
}
