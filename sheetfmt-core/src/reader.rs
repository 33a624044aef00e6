//! Parsing of xlsx packages into the in-memory model.

#[cfg(feature = "fast-hash")]
use hashbrown::HashMap;
#[cfg(not(feature = "fast-hash"))]
use std::collections::HashMap;
use std::io::{BufRead, Cursor, Read, Seek};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rayon::prelude::*;
use zip::ZipArchive;

use crate::cell::{CellValue, InternedString};
use crate::error::{Result, SheetfmtError};
use crate::formula::translate_formula;
use crate::preserved::{
    capture_element, is_preserved_child, root_attributes, Relationship, PRESERVED_STYLE_CHILDREN,
};
use crate::style::{
    Alignment, Border, BorderStyle, CellStyle, Color, Fill, Font, NumberFormat,
};
use crate::utils::{
    coordinate_from_row_col, parse_coordinate_bytes, parse_f64_bytes, parse_u32_bytes, CellRange,
    MAX_COLUMN,
};
use crate::workbook::{NamedRange, Workbook};
use crate::worksheet::{CellData, SheetState, Worksheet};

/// One `<sheet>` entry of workbook.xml.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SheetEntry {
    pub name: String,
    pub sheet_id: u32,
    pub rel_id: String,
    pub state: SheetState,
}

/// Everything workbook.xml contributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WorkbookInfo {
    pub sheets: Vec<SheetEntry>,
    pub active_tab: usize,
    pub named_ranges: Vec<NamedRange>,
}

/// Styles resolved per cellXf index, plus the workbook's base font.
#[derive(Clone, Debug, Default)]
pub(crate) struct ParsedStyles {
    pub cell_styles: Vec<Option<Arc<CellStyle>>>,
    pub default_font: Option<Font>,
    /// Raw `dxfs`, `tableStyles` and `colors` elements.
    pub preserved: Vec<String>,
}

const THEME_REL_SUFFIX: &str = "/theme";

/// Parse a whole package.
pub(crate) fn read_workbook<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Workbook> {
    // Phase 1: pull every needed part into memory (ZIP access is sequential).
    let workbook_xml = read_zip_file_to_vec(archive, "xl/workbook.xml")?;
    let workbook_rels_xml = read_zip_file_to_vec(archive, "xl/_rels/workbook.xml.rels").ok();
    let shared_strings_xml = read_zip_file_to_vec(archive, "xl/sharedStrings.xml").ok();
    let styles_xml = read_zip_file_to_vec(archive, "xl/styles.xml").ok();

    let info = parse_workbook_xml(Cursor::new(&workbook_xml))?;
    let rels = match workbook_rels_xml {
        Some(xml) => parse_relationships(Cursor::new(&xml))?,
        None => Vec::new(),
    };
    let theme = match rels.iter().find(|rel| rel.rel_type.ends_with(THEME_REL_SUFFIX)) {
        Some(rel) => read_zip_file_to_vec(archive, &resolve_part_path(&rel.target)).ok(),
        None => None,
    };

    let mut sheet_parts = Vec::with_capacity(info.sheets.len());
    for entry in &info.sheets {
        let path = match rels.iter().find(|rel| rel.id == entry.rel_id) {
            Some(rel) => resolve_part_path(&rel.target),
            None => format!("xl/worksheets/sheet{}.xml", entry.sheet_id),
        };
        let xml = read_zip_file_to_vec(archive, &path)?;
        let sheet_rels = match read_zip_file_to_vec(archive, &rels_path_for(&path)) {
            Ok(rels_xml) => parse_relationships(Cursor::new(&rels_xml))?,
            Err(_) => Vec::new(),
        };
        sheet_parts.push(SheetPart { entry, xml, rels: sheet_rels });
    }

    // Phase 2: shared data needed by every sheet.
    let shared_strings = match shared_strings_xml {
        Some(xml) => parse_shared_strings_xml(Cursor::new(&xml))?,
        None => Vec::new(),
    };
    let styles = match styles_xml {
        Some(xml) => parse_styles_xml(&xml)?,
        None => ParsedStyles::default(),
    };

    // Phase 3: sheets, in parallel when there is more than one.
    let parse_one = |part: &SheetPart<'_>| -> Result<Worksheet> {
        let mut worksheet = Worksheet::new(part.entry.name.clone());
        worksheet.state = part.entry.state;
        parse_worksheet_xml(
            Cursor::new(&part.xml),
            &shared_strings,
            &styles.cell_styles,
            &part.rels,
            &mut worksheet,
        )?;
        Ok(worksheet)
    };
    let worksheets: Vec<Result<Worksheet>> = if sheet_parts.len() > 1 {
        sheet_parts.par_iter().map(parse_one).collect()
    } else {
        sheet_parts.iter().map(parse_one).collect()
    };

    let mut workbook = Workbook::new();
    for worksheet in worksheets {
        workbook.worksheets.push(worksheet?);
    }
    workbook.named_ranges = info.named_ranges;
    workbook.set_active(info.active_tab.min(workbook.worksheets.len().saturating_sub(1)));
    if let Some(font) = styles.default_font {
        workbook.default_font = font;
    }
    workbook.preserved_styles = styles.preserved;
    workbook.theme = theme;

    Ok(workbook)
}

/// A worksheet part and its relationships, read ahead of parsing.
struct SheetPart<'a> {
    entry: &'a SheetEntry,
    xml: Vec<u8>,
    rels: Vec<Relationship>,
}

/// `xl/worksheets/sheet1.xml` keeps its relationships in `xl/worksheets/_rels/sheet1.xml.rels`.
fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Relationship targets are relative to `xl/` unless absolute within the package.
fn resolve_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// Read a file from the ZIP archive into a Vec<u8>.
fn read_zip_file_to_vec<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>> {
    let mut file = archive.by_name(path).map_err(|e| {
        SheetfmtError::InvalidFormat(format!("Failed to find {} in archive: {}", path, e))
    })?;
    let mut buf = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn attr_str(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key || attr.key.local_name().as_ref() == key)
        .map(|attr| {
            attr.unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned())
        })
}

fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_str(e, key).and_then(|s| s.trim().parse().ok())
}

fn attr_f64(e: &BytesStart, key: &[u8]) -> Option<f64> {
    attr_str(e, key).and_then(|s| s.trim().parse().ok())
}

/// Boolean attribute: "1"/"true" is true, anything else (or absent) is false.
fn attr_bool(e: &BytesStart, key: &[u8]) -> bool {
    attr_str(e, key)
        .map(|s| s == "1" || s == "true")
        .unwrap_or(false)
}

/// Flag elements like `<b/>` are on unless `val` says otherwise.
fn flag_on(e: &BytesStart) -> bool {
    attr_str(e, b"val")
        .map(|s| s != "0" && s != "false")
        .unwrap_or(true)
}

fn parse_color(e: &BytesStart) -> Option<Color> {
    if let Some(rgb) = attr_str(e, b"rgb") {
        Some(Color::Rgb(rgb))
    } else if let Some(index) = attr_u32(e, b"theme") {
        Some(Color::Theme {
            index,
            tint: attr_f64(e, b"tint"),
        })
    } else if let Some(index) = attr_u32(e, b"indexed") {
        Some(Color::Indexed(index))
    } else if attr_bool(e, b"auto") {
        Some(Color::Auto)
    } else {
        None
    }
}

/// Parse workbook.xml: sheet list, active tab, defined names.
pub(crate) fn parse_workbook_xml<R: BufRead>(reader: R) -> Result<WorkbookInfo> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut info = WorkbookInfo::default();
    let mut buf = Vec::new();
    let mut current_name: Option<NamedRange> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"sheet" => {
                    if let (Some(name), Some(sheet_id), Some(rel_id)) =
                        (attr_str(&e, b"name"), attr_u32(&e, b"sheetId"), attr_str(&e, b"id"))
                    {
                        let state = attr_str(&e, b"state")
                            .map(|s| SheetState::from_attr(&s))
                            .unwrap_or_default();
                        info.sheets.push(SheetEntry { name, sheet_id, rel_id, state });
                    }
                }
                b"workbookView" => {
                    info.active_tab = attr_u32(&e, b"activeTab").unwrap_or(0) as usize;
                }
                b"definedName" => {
                    current_name = attr_str(&e, b"name").map(|name| NamedRange {
                        name,
                        value: String::new(),
                        local_sheet_id: attr_u32(&e, b"localSheetId"),
                        hidden: attr_bool(&e, b"hidden"),
                    });
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let Some(named) = current_name.as_mut() {
                    named.value.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"definedName" {
                    if let Some(named) = current_name.take() {
                        info.named_ranges.push(named);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetfmtError::ParseError(format!(
                    "XML parsing error in workbook.xml: {}",
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(info)
}

/// Parse a `.rels` part.
pub(crate) fn parse_relationships<R: BufRead>(reader: R) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_reader(reader);
    reader.config_mut().trim_text(true);

    let mut rels = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"Relationship" {
                    if let (Some(id), Some(target)) = (attr_str(&e, b"Id"), attr_str(&e, b"Target")) {
                        rels.push(Relationship {
                            id,
                            rel_type: attr_str(&e, b"Type").unwrap_or_default(),
                            target,
                            external: attr_str(&e, b"TargetMode").as_deref() == Some("External"),
                        });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetfmtError::ParseError(format!(
                    "XML parsing error in relationships part: {}",
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Parse sharedStrings.xml. Rich-text runs are concatenated; phonetic runs are skipped.
pub(crate) fn parse_shared_strings_xml<R: BufRead>(reader: R) -> Result<Vec<InternedString>> {
    let mut reader = Reader::from_reader(reader);
    // Whitespace inside <t> is significant.
    reader.config_mut().trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => in_t = true,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"si" {
                    strings.push(Arc::from(""));
                }
            }
            Ok(Event::Text(e)) => {
                if in_t && !in_phonetic {
                    current.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if in_t && !in_phonetic {
                    current.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                b"si" => {
                    strings.push(Arc::from(current.as_str()));
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetfmtError::ParseError(format!(
                    "XML parsing error in sharedStrings.xml: {}",
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum StyleSection {
    None,
    NumFmts,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

/// cellXf attributes before font/fill/border indexes are resolved.
#[derive(Default)]
struct RawXf {
    num_fmt_id: u32,
    font_id: usize,
    fill_id: usize,
    border_id: usize,
    alignment: Option<Alignment>,
}

fn raw_xf(e: &BytesStart) -> RawXf {
    RawXf {
        num_fmt_id: attr_u32(e, b"numFmtId").unwrap_or(0),
        font_id: attr_u32(e, b"fontId").unwrap_or(0) as usize,
        fill_id: attr_u32(e, b"fillId").unwrap_or(0) as usize,
        border_id: attr_u32(e, b"borderId").unwrap_or(0) as usize,
        alignment: None,
    }
}

fn parse_alignment(e: &BytesStart) -> Alignment {
    Alignment {
        horizontal: attr_str(e, b"horizontal").and_then(|s| s.parse().ok()),
        vertical: attr_str(e, b"vertical").and_then(|s| s.parse().ok()),
        wrap_text: attr_bool(e, b"wrapText"),
        text_rotation: attr_u32(e, b"textRotation"),
        indent: attr_u32(e, b"indent"),
        shrink_to_fit: attr_bool(e, b"shrinkToFit"),
    }
}

fn apply_font_child(e: &BytesStart, font: &mut Font) {
    match e.local_name().as_ref() {
        b"b" => font.bold = flag_on(e),
        b"i" => font.italic = flag_on(e),
        b"strike" => font.strike = flag_on(e),
        b"u" => {
            let kind = attr_str(e, b"val").unwrap_or_else(|| "single".to_string());
            font.underline = (kind != "none").then_some(kind);
        }
        b"sz" => font.size = attr_f64(e, b"val"),
        b"name" | b"rFont" => font.name = attr_str(e, b"val"),
        b"color" => font.color = parse_color(e),
        b"family" => font.family = attr_u32(e, b"val"),
        b"scheme" => font.scheme = attr_str(e, b"val"),
        b"vertAlign" => font.vert_align = attr_str(e, b"val"),
        _ => {}
    }
}

/// Parse styles.xml into one resolved CellStyle per cellXf.
pub(crate) fn parse_styles_xml(xml: &[u8]) -> Result<ParsedStyles> {
    let mut reader = Reader::from_reader(Cursor::new(xml));
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut section = StyleSection::None;
    let mut number_formats: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<Font> = Vec::new();
    let mut fills: Vec<Fill> = Vec::new();
    let mut borders: Vec<Border> = Vec::new();
    let mut xfs: Vec<RawXf> = Vec::new();

    let mut font = Font::default();
    let mut fill = Fill::default();
    let mut border = Border::default();
    let mut border_side: Option<Vec<u8>> = None;
    let mut xf: Option<RawXf> = None;
    let mut preserved: Vec<String> = Vec::new();
    let mut captured: Option<Event<'static>> = None;

    loop {
        let event = reader.read_event_into(&mut buf);
        let (e, is_empty) = match event {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                match (section, e.local_name().as_ref()) {
                    (_, b"numFmts") | (_, b"fonts") | (_, b"fills") | (_, b"borders")
                    | (_, b"cellXfs") => section = StyleSection::None,
                    (StyleSection::Fonts, b"font") => fonts.push(std::mem::take(&mut font)),
                    (StyleSection::Fills, b"fill") => fills.push(std::mem::take(&mut fill)),
                    (StyleSection::Borders, b"border") => {
                        borders.push(std::mem::take(&mut border))
                    }
                    (StyleSection::Borders, name) if border_side.as_deref() == Some(name) => {
                        border_side = None;
                    }
                    (StyleSection::CellXfs, b"xf") => {
                        if let Some(done) = xf.take() {
                            xfs.push(done);
                        }
                    }
                    _ => {}
                }
                buf.clear();
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetfmtError::ParseError(format!(
                    "XML parsing error in styles.xml: {}",
                    e
                )));
            }
            _ => {
                buf.clear();
                continue;
            }
        };

        let name = e.local_name();
        let name = name.as_ref();
        match (section, name) {
            (_, b"numFmts") => section = StyleSection::NumFmts,
            (_, b"fonts") => section = StyleSection::Fonts,
            (_, b"fills") => section = StyleSection::Fills,
            (_, b"borders") => section = StyleSection::Borders,
            (_, b"cellXfs") => section = StyleSection::CellXfs,
            (_, b"cellStyleXfs") | (_, b"cellStyles") => section = StyleSection::None,
            (_, kept) if PRESERVED_STYLE_CHILDREN.contains(&kept) => {
                section = StyleSection::None;
                let owned = e.clone().into_owned();
                captured = Some(if is_empty { Event::Empty(owned) } else { Event::Start(owned) });
            }
            (StyleSection::NumFmts, b"numFmt") => {
                if let (Some(id), Some(code)) = (attr_u32(&e, b"numFmtId"), attr_str(&e, b"formatCode")) {
                    number_formats.insert(id, code);
                }
            }
            (StyleSection::Fonts, b"font") => {
                font = Font::default();
                if is_empty {
                    fonts.push(Font::default());
                }
            }
            (StyleSection::Fonts, _) => apply_font_child(&e, &mut font),
            (StyleSection::Fills, b"fill") => {
                fill = Fill::default();
                if is_empty {
                    fills.push(Fill::default());
                }
            }
            (StyleSection::Fills, b"patternFill") => {
                fill.pattern_type = attr_str(&e, b"patternType");
            }
            (StyleSection::Fills, b"fgColor") => fill.fg_color = parse_color(&e),
            (StyleSection::Fills, b"bgColor") => fill.bg_color = parse_color(&e),
            (StyleSection::Borders, b"border") => {
                border = Border::default();
                if is_empty {
                    borders.push(Border::default());
                }
            }
            (StyleSection::Borders, b"color") => {
                if let Some(side) = border_side.as_deref() {
                    if let Some(Some(edge)) = border.side_mut(side) {
                        edge.color = parse_color(&e);
                    }
                }
            }
            (StyleSection::Borders, side) => {
                let style = attr_str(&e, b"style");
                if let Some(slot) = border.side_mut(side) {
                    *slot = style.map(BorderStyle::new);
                    if !is_empty {
                        border_side = Some(side.to_vec());
                    }
                }
            }
            (StyleSection::CellXfs, b"xf") => {
                if is_empty {
                    xfs.push(raw_xf(&e));
                } else {
                    xf = Some(raw_xf(&e));
                }
            }
            (StyleSection::CellXfs, b"alignment") => {
                if let Some(current) = xf.as_mut() {
                    current.alignment = Some(parse_alignment(&e));
                }
            }
            _ => {}
        }
        buf.clear();

        if let Some(first) = captured.take() {
            let element = capture_element(&mut reader, first, &mut buf, &mut Vec::new())?;
            preserved.push(element.xml);
            buf.clear();
        }
    }

    let cell_styles = xfs
        .iter()
        .map(|raw| {
            let style = CellStyle {
                font: (raw.font_id != 0).then(|| fonts.get(raw.font_id).cloned()).flatten(),
                fill: (raw.fill_id != 0).then(|| fills.get(raw.fill_id).cloned()).flatten(),
                border: (raw.border_id != 0)
                    .then(|| borders.get(raw.border_id).cloned())
                    .flatten(),
                alignment: raw.alignment.clone().filter(|a| !a.is_default()),
                number_format: match number_formats.get(&raw.num_fmt_id) {
                    Some(code) => Some(NumberFormat::Custom(code.clone())),
                    None if raw.num_fmt_id != 0 => Some(NumberFormat::Builtin(raw.num_fmt_id)),
                    None => None,
                },
            };
            (style != CellStyle::default()).then(|| Arc::new(style))
        })
        .collect();

    Ok(ParsedStyles {
        cell_styles,
        default_font: fonts.into_iter().next(),
        preserved,
    })
}

/// What the `<v>` of a cell should be read as.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Number,
    Shared,
    Bool,
    Date,
    Inline,
    FormulaString,
    Error,
}

impl CellKind {
    fn from_attr(t: &[u8]) -> Self {
        match t {
            b"s" => CellKind::Shared,
            b"b" => CellKind::Bool,
            b"d" => CellKind::Date,
            b"inlineStr" => CellKind::Inline,
            b"str" => CellKind::FormulaString,
            b"e" => CellKind::Error,
            _ => CellKind::Number,
        }
    }
}

/// Master of a shared-formula group, keyed by its `si` index.
struct SharedFormula {
    row: u32,
    column: u32,
    text: String,
}

/// `t`, `si` and `ref` of a cell's `<f>` element.
#[derive(Default)]
struct FormulaAttrs {
    kind: Option<String>,
    shared_index: Option<u32>,
    range: Option<String>,
}

/// Cell under construction while its children stream past.
struct PendingCell {
    row: u32,
    column: u32,
    kind: CellKind,
    style: Option<Arc<CellStyle>>,
    value_text: Option<String>,
    formula: Option<String>,
    formula_attrs: FormulaAttrs,
    inline_text: Option<String>,
}

impl PendingCell {
    fn new(row: u32, column: u32, kind: CellKind, style: Option<Arc<CellStyle>>) -> Self {
        PendingCell {
            row,
            column,
            kind,
            style,
            value_text: None,
            formula: None,
            formula_attrs: FormulaAttrs::default(),
            inline_text: None,
        }
    }

    fn finish(
        mut self,
        shared_strings: &[InternedString],
        shared_formulas: &mut HashMap<u32, SharedFormula>,
    ) -> CellData {
        let value = match self.formula_value(shared_formulas) {
            Some(formula) => formula,
            None => cell_value(self.kind, self.value_text, self.inline_text, shared_strings),
        };
        CellData {
            value,
            style: self.style,
        }
    }

    /// Resolve the `<f>` element. Shared-group members without text take the
    /// master's formula moved by their offset from it; a textless formula with
    /// no master falls back to the cached value.
    fn formula_value(&mut self, shared_formulas: &mut HashMap<u32, SharedFormula>) -> Option<CellValue> {
        let text = self.formula.take()?;
        let attrs = std::mem::take(&mut self.formula_attrs);
        match (attrs.kind.as_deref(), attrs.shared_index) {
            (Some("shared"), Some(index)) if text.is_empty() => {
                let master = shared_formulas.get(&index)?;
                let rows = i64::from(self.row) - i64::from(master.row);
                let columns = i64::from(self.column) - i64::from(master.column);
                Some(CellValue::Formula(translate_formula(&master.text, rows, columns)))
            }
            (Some("shared"), Some(index)) => {
                shared_formulas.insert(
                    index,
                    SharedFormula { row: self.row, column: self.column, text: text.clone() },
                );
                Some(CellValue::Formula(text))
            }
            _ if text.is_empty() => None,
            (Some("array"), _) => Some(CellValue::ArrayFormula {
                formula: text,
                range: attrs
                    .range
                    .unwrap_or_else(|| coordinate_from_row_col(self.row, self.column)),
            }),
            _ => Some(CellValue::Formula(text)),
        }
    }
}

fn cell_value(
    kind: CellKind,
    value_text: Option<String>,
    inline_text: Option<String>,
    shared_strings: &[InternedString],
) -> CellValue {
    if kind == CellKind::Inline {
        return inline_text.map(CellValue::string).unwrap_or(CellValue::Empty);
    }
    let Some(text) = value_text else {
        return CellValue::Empty;
    };
    match kind {
        CellKind::Shared => match text.trim().parse::<usize>() {
            Ok(idx) => shared_strings
                .get(idx)
                .cloned()
                .map(CellValue::String)
                .unwrap_or(CellValue::Empty),
            Err(_) => CellValue::string(text),
        },
        CellKind::Bool => CellValue::Boolean(text.trim() == "1" || text.trim() == "true"),
        CellKind::Date => CellValue::Date(text),
        CellKind::Error => CellValue::Error(text),
        CellKind::FormulaString | CellKind::Inline => CellValue::string(text),
        CellKind::Number => match parse_f64_bytes(text.as_bytes()) {
            Some(n) => CellValue::Number(n),
            None => CellValue::string(text),
        },
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    Inline,
}

fn style_at(styles: &[Option<Arc<CellStyle>>], index: Option<u32>) -> Option<Arc<CellStyle>> {
    index.and_then(|idx| styles.get(idx as usize).cloned().flatten())
}

fn apply_col_element(e: &BytesStart, styles: &[Option<Arc<CellStyle>>], worksheet: &mut Worksheet) {
    let min = attr_u32(e, b"min").unwrap_or(1).max(1);
    let max = attr_u32(e, b"max").unwrap_or(min).min(MAX_COLUMN);
    let width = attr_f64(e, b"width");
    let hidden = attr_bool(e, b"hidden");
    let style = style_at(styles, attr_u32(e, b"style"));
    if width.is_none() && !hidden && style.is_none() {
        return;
    }
    for column in min..=max {
        let dim = worksheet.column_dimension_mut(column);
        dim.width = width;
        dim.hidden = hidden;
        dim.style = style.clone();
    }
}

/// Parse one worksheet part.
///
/// Children listed in [`crate::preserved`] are kept as raw XML; hyperlink targets
/// are looked up in `relationships`.
pub(crate) fn parse_worksheet_xml<R: BufRead>(
    reader: R,
    shared_strings: &[InternedString],
    styles: &[Option<Arc<CellStyle>>],
    relationships: &[Relationship],
    worksheet: &mut Worksheet,
) -> Result<()> {
    let mut reader = Reader::from_reader(reader);
    // Whitespace inside values is significant.
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut current_row: u32 = 0;
    let mut last_column: u32 = 0;
    let mut pending: Option<PendingCell> = None;
    let mut target = TextTarget::None;
    let mut text = String::new();
    let mut in_phonetic = false;
    let mut shared_formulas: HashMap<u32, SharedFormula> = HashMap::new();
    let mut depth: usize = 0;
    let mut captured: Option<Event<'static>> = None;
    let mut hyperlink_ids: Vec<String> = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf);
        match event {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if depth == 1 && is_preserved_child(e.local_name().as_ref()) =>
            {
                let owned = e.clone().into_owned();
                captured = Some(if matches!(event, Ok(Event::Empty(_))) {
                    Event::Empty(owned)
                } else {
                    Event::Start(owned)
                });
            }
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let is_empty = matches!(event, Ok(Event::Empty(_)));
                if !is_empty {
                    depth += 1;
                }
                match e.local_name().as_ref() {
                    b"worksheet" if depth == 1 => {
                        worksheet.preserved.root_attributes = root_attributes(e);
                    }
                    b"col" => apply_col_element(e, styles, worksheet),
                    b"row" => {
                        current_row = attr_u32(e, b"r").unwrap_or(current_row + 1);
                        last_column = 0;
                        let height = attr_f64(e, b"ht");
                        let hidden = attr_bool(e, b"hidden");
                        let style = attr_bool(e, b"customFormat")
                            .then(|| style_at(styles, attr_u32(e, b"s")))
                            .flatten();
                        if height.is_some() || hidden || style.is_some() {
                            let dim = worksheet.row_dimension_mut(current_row);
                            dim.height = height;
                            dim.hidden = hidden;
                            dim.style = style;
                        }
                    }
                    b"c" => {
                        let (row, column) = attr_str(e, b"r")
                            .and_then(|r| parse_coordinate_bytes(r.as_bytes()))
                            .unwrap_or((current_row.max(1), last_column + 1));
                        last_column = column;
                        let kind = attr_str(e, b"t")
                            .map(|t| CellKind::from_attr(t.as_bytes()))
                            .unwrap_or(CellKind::Number);
                        let style = style_at(
                            styles,
                            attr_str(e, b"s").and_then(|s| parse_u32_bytes(s.as_bytes())),
                        );
                        let cell = PendingCell::new(row, column, kind, style);
                        if is_empty {
                            let data = cell.finish(shared_strings, &mut shared_formulas);
                            worksheet.set_cell_data(row, column, data);
                        } else {
                            pending = Some(cell);
                        }
                    }
                    b"v" if pending.is_some() && !is_empty => {
                        target = TextTarget::Value;
                        text.clear();
                    }
                    b"f" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.formula_attrs = FormulaAttrs {
                                kind: attr_str(e, b"t"),
                                shared_index: attr_u32(e, b"si"),
                                range: attr_str(e, b"ref"),
                            };
                            if is_empty {
                                cell.formula = Some(String::new());
                            } else {
                                target = TextTarget::Formula;
                                text.clear();
                            }
                        }
                    }
                    b"t" if pending.is_some() && !is_empty && !in_phonetic => {
                        target = TextTarget::Inline;
                    }
                    b"rPh" if !is_empty => in_phonetic = true,
                    b"mergeCell" => {
                        if let Some(range) = attr_str(e, b"ref").and_then(|r| CellRange::parse(&r).ok()) {
                            worksheet.add_merged_range(range);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if target != TextTarget::None {
                    text.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::CData(e)) => {
                if target != TextTarget::None {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                match e.local_name().as_ref() {
                    b"v" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.value_text = Some(std::mem::take(&mut text));
                        }
                        target = TextTarget::None;
                    }
                    b"f" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.formula = Some(std::mem::take(&mut text));
                        }
                        target = TextTarget::None;
                    }
                    b"t" => {
                        if target == TextTarget::Inline {
                            target = TextTarget::None;
                        }
                    }
                    b"rPh" => in_phonetic = false,
                    b"is" => {
                        if let Some(cell) = pending.as_mut() {
                            cell.inline_text = Some(std::mem::take(&mut text));
                        }
                    }
                    b"c" => {
                        if let Some(cell) = pending.take() {
                            let (row, column) = (cell.row, cell.column);
                            let data = cell.finish(shared_strings, &mut shared_formulas);
                            worksheet.set_cell_data(row, column, data);
                        }
                        target = TextTarget::None;
                        text.clear();
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SheetfmtError::ParseError(format!(
                    "XML parsing error in worksheet '{}': {}",
                    worksheet.title(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();

        if let Some(first) = captured.take() {
            let element = capture_element(&mut reader, first, &mut buf, &mut hyperlink_ids)?;
            worksheet.preserved.elements.push(element);
            buf.clear();
        }
    }

    worksheet.preserved.hyperlinks = relationships
        .iter()
        .filter(|rel| hyperlink_ids.contains(&rel.id))
        .cloned()
        .collect();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{HorizontalAlignment, VerticalAlignment};

    #[test]
    fn test_parse_relationships() {
        let rels_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet5.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a?b=1&amp;c=2" TargetMode="External"/>
</Relationships>"#;

        let rels = parse_relationships(Cursor::new(rels_xml)).unwrap();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[0].id, "rId1");
        assert_eq!(rels[0].target, "worksheets/sheet1.xml");
        assert!(!rels[0].external);
        assert_eq!(resolve_part_path(&rels[1].target), "xl/worksheets/sheet5.xml");
        assert!(rels[2].rel_type.ends_with("/hyperlink"));
        assert_eq!(rels[2].target, "https://example.com/a?b=1&c=2");
        assert!(rels[2].external);
    }

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("xl/worksheets/sheet1.xml"), "xl/worksheets/_rels/sheet1.xml.rels");
        assert_eq!(rels_path_for("sheet.xml"), "_rels/sheet.xml.rels");
    }

    #[test]
    fn test_parse_workbook_xml() {
        let workbook_xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews><workbookView activeTab="1"/></bookViews>
    <sheets>
        <sheet name="Data" sheetId="8" r:id="rId1"/>
        <sheet name="Summary" sheetId="2" state="hidden" r:id="rId2"/>
    </sheets>
    <definedNames><definedName name="_xlnm.Print_Area" localSheetId="0">Data!$A$1:$W$20</definedName></definedNames>
</workbook>"#;

        let info = parse_workbook_xml(Cursor::new(workbook_xml)).unwrap();
        assert_eq!(info.sheets.len(), 2);
        assert_eq!(info.sheets[0].name, "Data");
        assert_eq!(info.sheets[0].sheet_id, 8);
        assert_eq!(info.sheets[0].rel_id, "rId1");
        assert_eq!(info.sheets[1].state, SheetState::Hidden);
        assert_eq!(info.active_tab, 1);
        assert_eq!(info.named_ranges[0].value, "Data!$A$1:$W$20");
        assert_eq!(info.named_ranges[0].local_sheet_id, Some(0));
    }

    #[test]
    fn test_parse_shared_strings() {
        let xml = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
<si><t>Plain</t></si>
<si><r><t>Rich </t></r><r><rPr><b/></rPr><t>text</t></r><rPh><t>ignored</t></rPh></si>
<si/>
<si><t xml:space="preserve">  padded </t></si>
</sst>"#;
        let strings = parse_shared_strings_xml(Cursor::new(xml)).unwrap();
        let strings: Vec<&str> = strings.iter().map(|s| s.as_ref()).collect();
        assert_eq!(strings, vec!["Plain", "Rich text", "", "  padded "]);
    }

    #[test]
    fn test_parse_styles() {
        let xml = br#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts>
<fonts count="2">
  <font><sz val="11"/><name val="Calibri"/><family val="2"/><scheme val="minor"/></font>
  <font><b/><i val="0"/><sz val="16"/><color rgb="FFFF0000"/></font>
</fonts>
<fills count="3">
  <fill><patternFill patternType="none"/></fill>
  <fill><patternFill patternType="gray125"/></fill>
  <fill><patternFill patternType="solid"><fgColor theme="4" tint="0.5"/><bgColor indexed="64"/></patternFill></fill>
</fills>
<borders count="2">
  <border><left/><right/><top/><bottom/><diagonal/></border>
  <border><left style="thin"><color rgb="FF000000"/></left><right style="thin"/><top/><bottom style="medium"/><diagonal/></border>
</borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="1" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="3">
  <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
  <xf numFmtId="164" fontId="1" fillId="2" borderId="1" xfId="0" applyAlignment="1"><alignment horizontal="left" vertical="center" wrapText="1"/></xf>
  <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0"/>
</cellXfs>
</styleSheet>"#;

        let parsed = parse_styles_xml(xml).unwrap();
        assert_eq!(parsed.cell_styles.len(), 3);
        assert!(parsed.cell_styles[0].is_none());
        assert_eq!(
            parsed.default_font.as_ref().and_then(|f| f.name.as_deref()),
            Some("Calibri")
        );

        let style = parsed.cell_styles[1].as_ref().unwrap();
        let font = style.font.as_ref().unwrap();
        assert!(font.bold);
        assert!(!font.italic);
        assert_eq!(font.size, Some(16.0));
        assert_eq!(font.color, Some(Color::rgb("FFFF0000")));

        let fill = style.fill.as_ref().unwrap();
        assert_eq!(fill.pattern_type.as_deref(), Some("solid"));
        assert_eq!(fill.fg_color, Some(Color::Theme { index: 4, tint: Some(0.5) }));
        assert_eq!(fill.bg_color, Some(Color::Indexed(64)));

        let border = style.border.as_ref().unwrap();
        assert_eq!(
            border.left,
            Some(BorderStyle::thin().with_color(Color::rgb("FF000000")))
        );
        assert_eq!(border.right, Some(BorderStyle::thin()));
        assert_eq!(border.top, None);
        assert_eq!(border.bottom, Some(BorderStyle::medium()));

        let align = style.alignment.as_ref().unwrap();
        assert_eq!(align.horizontal, Some(HorizontalAlignment::Left));
        assert_eq!(align.vertical, Some(VerticalAlignment::Center));
        assert!(align.wrap_text);
        assert_eq!(style.number_format, Some(NumberFormat::Custom("yyyy-mm-dd".into())));

        let date_style = parsed.cell_styles[2].as_ref().unwrap();
        assert_eq!(date_style.number_format, Some(NumberFormat::Builtin(14)));
        assert!(date_style.font.is_none());
    }

    #[test]
    fn test_parse_worksheet() {
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<cols><col min="2" max="4" width="12.5" customWidth="1"/><col min="6" max="6" width="0" hidden="1"/><col min="7" max="7" style="1"/></cols>
<sheetData>
<row r="1" ht="30" customHeight="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>42.5</v></c><c r="C1" t="b"><v>1</v></c></row>
<row r="3" hidden="1"><c r="A3" s="1"/><c r="B3"><f>SUM(B1:B2)</f><v>42.5</v></c><c r="C3" t="inlineStr"><is><t>inline &amp; text</t></is></c></row>
<row r="4"><c t="e"><v>#N/A</v></c><c t="str"><f></f><v>cached</v></c></row>
</sheetData>
<mergeCells count="1"><mergeCell ref="A5:C5"/></mergeCells>
</worksheet>"#;

        let shared: Vec<InternedString> = vec![Arc::from("Header")];
        let styles = vec![None, Some(Arc::new(CellStyle::new().with_font(Font::new().with_bold(true))))];
        let mut ws = Worksheet::new("Sheet1");
        parse_worksheet_xml(Cursor::new(xml), &shared, &styles, &[], &mut ws).unwrap();

        assert_eq!(ws.get_cell_value(1, 1), Some(&CellValue::string("Header")));
        assert_eq!(ws.get_cell_value(1, 2), Some(&CellValue::Number(42.5)));
        assert_eq!(ws.get_cell_value(1, 3), Some(&CellValue::Boolean(true)));
        assert_eq!(ws.get_cell_value(3, 1), Some(&CellValue::Empty));
        assert!(ws.get_cell_style(3, 1).unwrap().font.as_ref().unwrap().bold);
        assert_eq!(ws.get_cell_value(3, 2), Some(&CellValue::Formula("SUM(B1:B2)".into())));
        assert_eq!(ws.get_cell_value(3, 3), Some(&CellValue::string("inline & text")));
        assert_eq!(ws.get_cell_value(4, 1), Some(&CellValue::Error("#N/A".into())));
        assert_eq!(ws.get_cell_value(4, 2), Some(&CellValue::string("cached")));

        assert_eq!(ws.row_dimension(1).and_then(|d| d.height), Some(30.0));
        assert!(ws.row_dimension(3).unwrap().hidden);
        assert!(ws.row_dimension(2).is_none());
        for col in 2..=4 {
            assert_eq!(ws.column_dimension(col).and_then(|d| d.width), Some(12.5));
        }
        assert!(ws.column_dimension(6).unwrap().hidden);
        let styled = ws.column_dimension(7).unwrap();
        assert!(styled.width.is_none());
        assert!(styled.style.as_ref().unwrap().font.as_ref().unwrap().bold);
        assert_eq!(ws.merged_cells(), &[CellRange::parse("A5:C5").unwrap()]);
        assert_eq!(ws.max_row(), 4);
        assert_eq!(ws.max_column(), 3);
    }

    fn parse_sheet(xml: &str, relationships: &[Relationship]) -> Worksheet {
        let styles = vec![None, Some(Arc::new(CellStyle::new().with_font(Font::new().with_bold(true))))];
        let mut ws = Worksheet::new("Sheet1");
        parse_worksheet_xml(Cursor::new(xml), &[], &styles, relationships, &mut ws).unwrap();
        ws
    }

    #[test]
    fn test_shared_formulas_expand_per_cell() {
        let ws = parse_sheet(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1"><v>1</v></c><c r="B1"><f t="shared" ref="B1:C3" si="0">A1*2+$A$1</f><v>3</v></c><c r="C1"><f t="shared" si="0"/><v>5</v></c></row>
<row r="2"><c r="B2"><f t="shared" si="0"></f><v>4</v></c></row>
<row r="3"><c r="C3"><f t="shared" si="0"/><v>7</v></c><c r="D3"><f t="shared" si="9"/><v>8</v></c></row>
</sheetData></worksheet>"#,
            &[],
        );
        assert_eq!(ws.get_cell_value(1, 2), Some(&CellValue::Formula("A1*2+$A$1".into())));
        assert_eq!(ws.get_cell_value(1, 3), Some(&CellValue::Formula("B1*2+$A$1".into())));
        assert_eq!(ws.get_cell_value(2, 2), Some(&CellValue::Formula("A2*2+$A$1".into())));
        assert_eq!(ws.get_cell_value(3, 3), Some(&CellValue::Formula("B3*2+$A$1".into())));
        // No master for this group: the cached value stands.
        assert_eq!(ws.get_cell_value(3, 4), Some(&CellValue::Number(8.0)));
    }

    #[test]
    fn test_array_formula_keeps_range() {
        let ws = parse_sheet(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="C1"><f t="array" ref="C1:C2">A1:A2*B1:B2</f><v>2</v></c><c r="D1"><f t="array">SUM(A1:A2)</f><v>3</v></c></row>
<row r="2"><c r="C2"><v>6</v></c></row>
</sheetData></worksheet>"#,
            &[],
        );
        assert_eq!(
            ws.get_cell_value(1, 3),
            Some(&CellValue::ArrayFormula { formula: "A1:A2*B1:B2".into(), range: "C1:C2".into() })
        );
        assert_eq!(
            ws.get_cell_value(1, 4),
            Some(&CellValue::ArrayFormula { formula: "SUM(A1:A2)".into(), range: "D1".into() })
        );
        assert_eq!(ws.get_cell_value(2, 3), Some(&CellValue::Number(6.0)));
    }

    #[test]
    fn test_sheet_settings_are_preserved() {
        let hyperlink = Relationship {
            id: "rId2".into(),
            rel_type: "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink".into(),
            target: "https://example.com/".into(),
            external: true,
        };
        let unused = Relationship { id: "rId1".into(), ..hyperlink.clone() };
        let ws = parse_sheet(
            r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac">
<sheetPr><tabColor rgb="FF00B050"/></sheetPr>
<dimension ref="A1:B2"/>
<sheetViews><sheetView zoomScale="85" workbookViewId="0"><pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/></sheetView></sheetViews>
<sheetFormatPr defaultRowHeight="15" x14ac:dyDescent="0.25"/>
<sheetData><row r="2" s="1" customFormat="1"><c r="A2"><v>1</v></c></row><row r="3" s="1"/></sheetData>
<conditionalFormatting sqref="A1:A9"><cfRule type="cellIs" dxfId="0" priority="1" operator="greaterThan"><formula>5</formula></cfRule></conditionalFormatting>
<hyperlinks><hyperlink ref="B1" r:id="rId2"/></hyperlinks>
<pageMargins left="0.5" right="0.5" top="1" bottom="1" header="0.3" footer="0.3"/>
<pageSetup orientation="landscape" r:id="rId1"/>
<drawing r:id="rId3"/>
<extLst><ext uri="{78C0D931-6437-407d-A8EE-F0AAD7539E65}"/></extLst>
</worksheet>"#,
            &[unused, hyperlink.clone()],
        );

        let names: Vec<&str> = ws.preserved.elements.iter().map(|el| el.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "sheetPr",
                "sheetViews",
                "sheetFormatPr",
                "conditionalFormatting",
                "hyperlinks",
                "pageMargins",
                "pageSetup",
            ]
        );
        let views = ws.preserved.elements_named("sheetViews").next().unwrap();
        assert!(views.xml.contains(r#"state="frozen""#));
        let setup = ws.preserved.elements_named("pageSetup").next().unwrap();
        assert_eq!(setup.xml, r#"<pageSetup orientation="landscape"/>"#);
        assert_eq!(ws.preserved.hyperlinks, vec![hyperlink]);
        assert_eq!(
            ws.preserved.root_attributes,
            vec![(
                "xmlns:x14ac".to_string(),
                "http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac".to_string()
            )]
        );

        // The conditional format's <formula> is not read as a cell formula.
        assert_eq!(ws.get_cell_value(2, 1), Some(&CellValue::Number(1.0)));
        assert!(ws.row_dimension(2).unwrap().style.as_ref().unwrap().font.as_ref().unwrap().bold);
        assert!(ws.row_dimension(3).is_none());
    }

    #[test]
    fn test_style_extras_are_preserved() {
        let xml = br#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellXfs>
<dxfs count="1"><dxf><font><b/><color rgb="FF9C0006"/></font><fill><patternFill><bgColor rgb="FFFFC7CE"/></patternFill></fill></dxf></dxfs>
<tableStyles count="0" defaultTableStyle="TableStyleMedium2"/>
<colors><mruColors><color rgb="FF00B050"/></mruColors></colors>
</styleSheet>"#;
        let parsed = parse_styles_xml(xml).unwrap();
        assert_eq!(parsed.preserved.len(), 3);
        assert!(parsed.preserved[0].starts_with("<dxfs"));
        assert!(parsed.preserved[0].contains("FFFFC7CE"));
        assert_eq!(
            parsed.preserved[1],
            r#"<tableStyles count="0" defaultTableStyle="TableStyleMedium2"/>"#
        );
        assert_eq!(parsed.preserved[2], r#"<colors><mruColors><color rgb="FF00B050"/></mruColors></colors>"#);
        // dxf fonts do not leak into the cell font list.
        assert_eq!(parsed.default_font.and_then(|f| f.name).as_deref(), Some("Calibri"));
        assert_eq!(parsed.cell_styles.len(), 1);
    }
}
