//! Style definitions for text runs and paragraphs.

use serde::Serialize;

/// Default font family for generated documents.
pub const DEFAULT_FONT: &str = "Arial";

/// Text formatting style.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextStyle {
    /// Bold text
    pub bold: bool,
    /// Italic text
    pub italic: bool,
    /// Font name
    pub font_name: Option<String>,
    /// Font size in points
    pub font_size: Option<f32>,
}

impl TextStyle {
    /// Creates a new empty text style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bold style.
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Default::default()
        }
    }

    /// Creates an italic style.
    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Default::default()
        }
    }

    /// Sets the font size in points.
    pub fn size(mut self, points: f32) -> Self {
        self.font_size = Some(points);
        self
    }

    /// Sets the font family.
    pub fn font(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    /// Font size in half-points, the unit OOXML uses for `w:sz`.
    pub fn half_points(&self) -> Option<u32> {
        self.font_size.map(|pt| (pt * 2.0).round() as u32)
    }

    /// Returns true if this style has any run properties set.
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.font_name.is_some() || self.font_size.is_some()
    }
}

/// Paragraph-level style.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParagraphStyle {
    /// Heading level (0 = normal paragraph, 1-6 = heading levels)
    pub heading_level: u8,
    /// Text alignment
    pub alignment: Alignment,
    /// Left indentation in twips (1/20 pt)
    pub indent_twips: u32,
    /// Rule drawn under the paragraph
    pub bottom_border: Option<Border>,
}

impl ParagraphStyle {
    /// Creates a new default paragraph style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a heading style with the specified level.
    pub fn heading(level: u8) -> Self {
        Self {
            heading_level: level.min(6),
            ..Default::default()
        }
    }

    /// Sets the alignment.
    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the left indentation in twips.
    pub fn indented(mut self, twips: u32) -> Self {
        self.indent_twips = twips;
        self
    }

    /// Adds a bottom border.
    pub fn with_bottom_border(mut self, border: Border) -> Self {
        self.bottom_border = Some(border);
        self
    }

    /// Returns true if this is a heading.
    pub fn is_heading(&self) -> bool {
        self.heading_level > 0
    }
}

/// Text alignment options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Justify,
}

impl Alignment {
    /// Value of the OOXML `w:jc` element.
    pub fn ooxml_value(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Justify => "both",
        }
    }
}

/// A single paragraph border line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Border {
    /// Width in eighths of a point
    pub size: u32,
    /// Distance from text in points
    pub space: u32,
    /// Line color (RGB hex)
    pub color: String,
}

impl Border {
    /// Thin black rule used under section headings.
    pub fn rule() -> Self {
        Self {
            size: 6,
            space: 1,
            color: "000000".to_string(),
        }
    }
}
