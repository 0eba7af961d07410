//! Annotation data model
//!
//! Geometry is expressed in page space with a top-left origin and y growing
//! downward, in PDF points. The annotator converts to PDF user space when it
//! writes the annotation.

use serde::{Deserialize, Serialize};

/// Font size used for freehand text when none is given.
pub const DEFAULT_FONT_SIZE: f32 = 11.0;

/// Border width used for rectangles and circles when none is given.
pub const DEFAULT_BORDER_WIDTH: f32 = 1.0;

/// RGB color with channels in the 0-1 range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const YELLOW: Rgb = Rgb::new(1.0, 1.0, 0.0);
    pub const BLUE: Rgb = Rgb::new(0.0, 0.0, 1.0);
    pub const RED: Rgb = Rgb::new(1.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Channels forced into 0-1. NaN becomes 0.
    pub fn clamped(self) -> Self {
        fn channel(v: f32) -> f32 {
            if v.is_nan() {
                0.0
            } else {
                v.clamp(0.0, 1.0)
            }
        }
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    pub fn components(self) -> [f32; 3] {
        let c = self.clamped();
        [c.r, c.g, c.b]
    }

    /// Parse `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let hex = color.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.components();
        format!(
            "#{:02X}{:02X}{:02X}",
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8
        )
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<[f32; 3]> for Rgb {
    fn from([r, g, b]: [f32; 3]) -> Self {
        Self::new(r, g, b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Rectangle `(x0, y0)`-`(x1, y1)` in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageRect {
    /// Corners may be given in any order; the result is normalized.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_origin_size(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x0, self.y0)
    }
}

/// Stroke, fill and border width of rectangle and circle annotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub stroke: Rgb,
    pub fill: Option<Rgb>,
    pub width: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke: Rgb::BLACK,
            fill: None,
            width: DEFAULT_BORDER_WIDTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    TextNote,
    Highlight,
    Underline,
    Strikeout,
    Rectangle,
    Circle,
    FreehandText,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 7] = [
        AnnotationKind::TextNote,
        AnnotationKind::Highlight,
        AnnotationKind::Underline,
        AnnotationKind::Strikeout,
        AnnotationKind::Rectangle,
        AnnotationKind::Circle,
        AnnotationKind::FreehandText,
    ];

    /// Label shown in the annotation type picker.
    pub fn label(self) -> &'static str {
        match self {
            AnnotationKind::TextNote => "Text Note",
            AnnotationKind::Highlight => "Highlight",
            AnnotationKind::Underline => "Underline",
            AnnotationKind::Strikeout => "Strikeout",
            AnnotationKind::Rectangle => "Rectangle",
            AnnotationKind::Circle => "Circle",
            AnnotationKind::FreehandText => "Freehand Text",
        }
    }

    /// Noun used in error messages ("Failed to add highlight").
    pub fn noun(self) -> &'static str {
        match self {
            AnnotationKind::TextNote => "text annotation",
            AnnotationKind::Highlight => "highlight",
            AnnotationKind::Underline => "underline",
            AnnotationKind::Strikeout => "strikeout",
            AnnotationKind::Rectangle => "rectangle",
            AnnotationKind::Circle => "circle",
            AnnotationKind::FreehandText => "freehand text",
        }
    }

    /// Point-anchored kinds use only the record's origin; the rest use its rectangle.
    pub fn is_point_based(self) -> bool {
        matches!(self, AnnotationKind::TextNote | AnnotationKind::FreehandText)
    }

    pub fn default_color(self) -> Rgb {
        match self {
            AnnotationKind::TextNote | AnnotationKind::Highlight => Rgb::YELLOW,
            AnnotationKind::Underline => Rgb::BLUE,
            AnnotationKind::Strikeout => Rgb::RED,
            AnnotationKind::Rectangle | AnnotationKind::Circle | AnnotationKind::FreehandText => {
                Rgb::BLACK
            }
        }
    }
}

/// One pending annotation, as collected from the editor's form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// Zero-based page index.
    pub page: usize,
    pub kind: AnnotationKind,
    pub position: Point,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub text: String,
    pub color: Rgb,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub border_width: Option<f32>,
    #[serde(default)]
    pub fill: Option<Rgb>,
}

impl AnnotationRecord {
    pub fn new(kind: AnnotationKind, page: usize, position: Point) -> Self {
        Self {
            page,
            kind,
            position,
            width: 0.0,
            height: 0.0,
            text: String::new(),
            color: kind.default_color(),
            font_size: None,
            border_width: None,
            fill: None,
        }
    }

    pub fn text_note(page: usize, position: Point, text: impl Into<String>) -> Self {
        Self::new(AnnotationKind::TextNote, page, position).with_text(text)
    }

    pub fn freehand_text(
        page: usize,
        position: Point,
        text: impl Into<String>,
        font_size: f32,
        color: Rgb,
    ) -> Self {
        let mut record = Self::new(AnnotationKind::FreehandText, page, position).with_text(text);
        record.font_size = Some(font_size);
        record.color = color;
        record
    }

    /// Highlight, underline, strikeout, rectangle or circle over `rect`.
    pub fn area(kind: AnnotationKind, page: usize, rect: PageRect) -> Self {
        let mut record = Self::new(kind, page, rect.origin());
        record.width = rect.width();
        record.height = rect.height();
        record
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn rect(&self) -> PageRect {
        PageRect::from_origin_size(self.position.x, self.position.y, self.width, self.height)
    }

    pub fn font_size(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            stroke: self.color,
            fill: self.fill,
            width: self.border_width.unwrap_or(DEFAULT_BORDER_WIDTH),
        }
    }
}

impl std::fmt::Display for AnnotationRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview: String = self.text.chars().take(30).collect();
        write!(
            f,
            "{} at ({:.1}, {:.1}): {}",
            self.kind.label(),
            self.position.x,
            self.position.y,
            preview
        )
    }
}
