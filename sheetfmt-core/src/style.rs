//! Cell styling types: Font, Fill, Border, Alignment, CellStyle, and the style registry.

use std::fmt;
use std::str::FromStr;

use crate::error::SheetfmtError;

/// A colour reference as stored in styles.xml.
#[derive(Clone, Debug, PartialEq)]
pub enum Color {
    /// ARGB hex, e.g. "FF000000".
    Rgb(String),
    /// Theme colour index with an optional tint.
    Theme { index: u32, tint: Option<f64> },
    /// Legacy indexed palette entry.
    Indexed(u32),
    /// System-dependent automatic colour.
    Auto,
}

impl Color {
    pub fn rgb<S: Into<String>>(argb: S) -> Self {
        Color::Rgb(argb.into())
    }
}

/// Font properties for cell styling.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Font {
    /// Font family name (e.g., "Calibri", "Arial").
    pub name: Option<String>,
    /// Font size in points.
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    /// Underline kind ("single", "double", ...).
    pub underline: Option<String>,
    pub strike: bool,
    pub color: Option<Color>,
    /// Font family classification (2 = swiss, ...).
    pub family: Option<u32>,
    /// Theme font scheme ("minor", "major").
    pub scheme: Option<String>,
    /// Superscript/subscript.
    pub vert_align: Option<String>,
}

impl Font {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HorizontalAlignment {
    General,
    Left,
    Center,
    Right,
    Fill,
    Justify,
    CenterContinuous,
    Distributed,
}

impl HorizontalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAlignment::General => "general",
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
            HorizontalAlignment::Fill => "fill",
            HorizontalAlignment::Justify => "justify",
            HorizontalAlignment::CenterContinuous => "centerContinuous",
            HorizontalAlignment::Distributed => "distributed",
        }
    }
}

impl fmt::Display for HorizontalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HorizontalAlignment {
    type Err = SheetfmtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "general" => HorizontalAlignment::General,
            "left" => HorizontalAlignment::Left,
            "center" => HorizontalAlignment::Center,
            "right" => HorizontalAlignment::Right,
            "fill" => HorizontalAlignment::Fill,
            "justify" => HorizontalAlignment::Justify,
            "centerContinuous" => HorizontalAlignment::CenterContinuous,
            "distributed" => HorizontalAlignment::Distributed,
            _ => {
                return Err(SheetfmtError::ParseError(format!(
                    "Unknown horizontal alignment: {}",
                    s
                )))
            }
        })
    }
}

/// Vertical text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerticalAlignment {
    Top,
    Center,
    Bottom,
    Justify,
    Distributed,
}

impl VerticalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Top => "top",
            VerticalAlignment::Center => "center",
            VerticalAlignment::Bottom => "bottom",
            VerticalAlignment::Justify => "justify",
            VerticalAlignment::Distributed => "distributed",
        }
    }
}

impl fmt::Display for VerticalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerticalAlignment {
    type Err = SheetfmtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "top" => VerticalAlignment::Top,
            "center" => VerticalAlignment::Center,
            "bottom" => VerticalAlignment::Bottom,
            "justify" => VerticalAlignment::Justify,
            "distributed" => VerticalAlignment::Distributed,
            _ => {
                return Err(SheetfmtError::ParseError(format!(
                    "Unknown vertical alignment: {}",
                    s
                )))
            }
        })
    }
}

/// Text alignment properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Alignment {
    pub horizontal: Option<HorizontalAlignment>,
    pub vertical: Option<VerticalAlignment>,
    pub wrap_text: bool,
    /// Text rotation angle (0-180, or 255 for vertical text).
    pub text_rotation: Option<u32>,
    pub indent: Option<u32>,
    pub shrink_to_fit: bool,
}

impl Alignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alignment with both axes set and wrapping on.
    pub fn wrapped(horizontal: HorizontalAlignment, vertical: VerticalAlignment) -> Self {
        Alignment {
            horizontal: Some(horizontal),
            vertical: Some(vertical),
            wrap_text: true,
            ..Default::default()
        }
    }

    pub fn with_horizontal(mut self, align: HorizontalAlignment) -> Self {
        self.horizontal = Some(align);
        self
    }

    pub fn with_vertical(mut self, align: VerticalAlignment) -> Self {
        self.vertical = Some(align);
        self
    }

    pub fn with_wrap_text(mut self, wrap: bool) -> Self {
        self.wrap_text = wrap;
        self
    }

    /// Whether any attribute differs from the default.
    pub fn is_default(&self) -> bool {
        self == &Alignment::default()
    }
}

/// Border style for a single edge.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderStyle {
    /// Line style: thin, medium, thick, dashed, dotted, double, hair, ...
    pub style: String,
    pub color: Option<Color>,
}

impl BorderStyle {
    pub fn new<S: Into<String>>(style: S) -> Self {
        BorderStyle {
            style: style.into(),
            color: None,
        }
    }

    pub fn thin() -> Self {
        Self::new("thin")
    }

    pub fn medium() -> Self {
        Self::new("medium")
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Cell border properties.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Border {
    pub left: Option<BorderStyle>,
    pub right: Option<BorderStyle>,
    pub top: Option<BorderStyle>,
    pub bottom: Option<BorderStyle>,
    pub diagonal: Option<BorderStyle>,
}

impl Border {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a border with all four edges the same style.
    pub fn all(style: BorderStyle) -> Self {
        Border {
            left: Some(style.clone()),
            right: Some(style.clone()),
            top: Some(style.clone()),
            bottom: Some(style),
            diagonal: None,
        }
    }

    pub(crate) fn side_mut(&mut self, side: &[u8]) -> Option<&mut Option<BorderStyle>> {
        match side {
            b"left" | b"start" => Some(&mut self.left),
            b"right" | b"end" => Some(&mut self.right),
            b"top" => Some(&mut self.top),
            b"bottom" => Some(&mut self.bottom),
            b"diagonal" => Some(&mut self.diagonal),
            _ => None,
        }
    }
}

/// Pattern fill (cell background).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fill {
    /// Pattern type: none, solid, gray125, darkGray, ...
    pub pattern_type: Option<String>,
    pub fg_color: Option<Color>,
    pub bg_color: Option<Color>,
}

impl Fill {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solid fill with the specified colour.
    pub fn solid(color: Color) -> Self {
        Fill {
            pattern_type: Some("solid".to_string()),
            fg_color: Some(color),
            bg_color: None,
        }
    }
}

/// Number format: a built-in id, or a custom format code.
#[derive(Clone, Debug, PartialEq)]
pub enum NumberFormat {
    Builtin(u32),
    Custom(String),
}

impl NumberFormat {
    /// Resolve a format code to a built-in id when Excel defines one.
    pub fn from_code(code: &str) -> Self {
        match builtin_num_fmt_id(code) {
            Some(id) => NumberFormat::Builtin(id),
            None => NumberFormat::Custom(code.to_string()),
        }
    }
}

/// Built-in number format id for a format code.
pub fn builtin_num_fmt_id(format: &str) -> Option<u32> {
    Some(match format {
        "General" => 0,
        "0" => 1,
        "0.00" => 2,
        "#,##0" => 3,
        "#,##0.00" => 4,
        "0%" => 9,
        "0.00%" => 10,
        "0.00E+00" => 11,
        "# ?/?" => 12,
        "# ??/??" => 13,
        "mm-dd-yy" => 14,
        "d-mmm-yy" => 15,
        "d-mmm" => 16,
        "mmm-yy" => 17,
        "h:mm AM/PM" => 18,
        "h:mm:ss AM/PM" => 19,
        "h:mm" => 20,
        "h:mm:ss" => 21,
        "m/d/yy h:mm" => 22,
        "#,##0 ;(#,##0)" => 37,
        "#,##0 ;[Red](#,##0)" => 38,
        "#,##0.00;(#,##0.00)" => 39,
        "#,##0.00;[Red](#,##0.00)" => 40,
        "mm:ss" => 45,
        "[h]:mm:ss" => 46,
        "mmss.0" => 47,
        "##0.0E+0" => 48,
        "@" => 49,
        _ => return None,
    })
}

/// Complete cell style combining all styling components.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellStyle {
    pub font: Option<Font>,
    pub alignment: Option<Alignment>,
    pub border: Option<Border>,
    pub fill: Option<Fill>,
    pub number_format: Option<NumberFormat>,
}

impl CellStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = Some(border);
        self
    }

    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = Some(format);
        self
    }
}

/// A cell format entry (cellXf) referencing fonts, fills, borders and number formats by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellXf {
    pub font_id: usize,
    pub fill_id: usize,
    pub border_id: usize,
    pub num_fmt_id: u32,
    /// Alignment is stored inline, not indexed.
    pub alignment: Option<Alignment>,
    pub apply_font: bool,
    pub apply_fill: bool,
    pub apply_border: bool,
    pub apply_number_format: bool,
    pub apply_alignment: bool,
}

/// Registry of the styles written to styles.xml.
///
/// Excel stores fonts, fills, borders and number formats as separate arrays,
/// and cellXfs that combine them by index. Cells refer to a cellXf by position.
#[derive(Clone, Debug, Default)]
pub struct StyleRegistry {
    pub fonts: Vec<Font>,
    pub fills: Vec<Fill>,
    pub borders: Vec<Border>,
    /// Custom number formats (format ID, format code).
    pub num_fmts: Vec<(u32, String)>,
    pub cell_xfs: Vec<CellXf>,
}

impl StyleRegistry {
    /// Create a registry holding the entries Excel requires at index 0 (and fill 1).
    pub fn new() -> Self {
        let mut registry = StyleRegistry::default();

        registry.fonts.push(Font {
            name: Some("Calibri".to_string()),
            size: Some(11.0),
            family: Some(2),
            scheme: Some("minor".to_string()),
            ..Default::default()
        });

        registry.fills.push(Fill {
            pattern_type: Some("none".to_string()),
            ..Default::default()
        });
        registry.fills.push(Fill {
            pattern_type: Some("gray125".to_string()),
            ..Default::default()
        });

        registry.borders.push(Border::default());
        registry.cell_xfs.push(CellXf::default());

        registry
    }

    /// Replace the default font (index 0). Loaded workbooks keep their own base font.
    pub fn set_default_font(&mut self, font: Font) {
        if let Some(slot) = self.fonts.first_mut() {
            *slot = font;
        }
    }

    fn index_of<T: PartialEq + Clone>(items: &mut Vec<T>, item: &T) -> usize {
        if let Some(idx) = items.iter().position(|existing| existing == item) {
            idx
        } else {
            items.push(item.clone());
            items.len() - 1
        }
    }

    pub fn get_or_add_font(&mut self, font: &Font) -> usize {
        Self::index_of(&mut self.fonts, font)
    }

    pub fn get_or_add_fill(&mut self, fill: &Fill) -> usize {
        Self::index_of(&mut self.fills, fill)
    }

    pub fn get_or_add_border(&mut self, border: &Border) -> usize {
        Self::index_of(&mut self.borders, border)
    }

    /// Get or create a number format ID. Custom formats start at 164.
    pub fn get_or_add_num_fmt(&mut self, format: &NumberFormat) -> u32 {
        match format {
            NumberFormat::Builtin(id) => *id,
            NumberFormat::Custom(code) => {
                if let Some(id) = builtin_num_fmt_id(code) {
                    return id;
                }
                if let Some((id, _)) = self.num_fmts.iter().find(|(_, f)| f == code) {
                    return *id;
                }
                let id = 164 + self.num_fmts.len() as u32;
                self.num_fmts.push((id, code.clone()));
                id
            }
        }
    }

    /// Get or create the cellXf index for a CellStyle.
    pub fn get_or_add_cell_xf(&mut self, style: &CellStyle) -> usize {
        let font_id = style.font.as_ref().map(|f| self.get_or_add_font(f)).unwrap_or(0);
        let fill_id = style.fill.as_ref().map(|f| self.get_or_add_fill(f)).unwrap_or(0);
        let border_id = style.border.as_ref().map(|b| self.get_or_add_border(b)).unwrap_or(0);
        let num_fmt_id = style
            .number_format
            .as_ref()
            .map(|nf| self.get_or_add_num_fmt(nf))
            .unwrap_or(0);
        let alignment = style.alignment.clone().filter(|a| !a.is_default());

        let xf = CellXf {
            font_id,
            fill_id,
            border_id,
            num_fmt_id,
            apply_font: style.font.is_some(),
            apply_fill: style.fill.is_some(),
            apply_border: style.border.is_some(),
            apply_number_format: style.number_format.is_some(),
            apply_alignment: alignment.is_some(),
            alignment,
        };

        Self::index_of(&mut self.cell_xfs, &xf)
    }
}
