//! Serialization of the in-memory model into xlsx package parts.

#[cfg(feature = "fast-hash")]
use hashbrown::HashMap;
#[cfg(not(feature = "fast-hash"))]
use std::collections::HashMap;
use std::collections::BTreeSet;
use std::io::{Seek, Write};

use zip::write::{ExtendedFileOptions, FileOptions};
use zip::ZipWriter;

use crate::cell::{CellValue, InternedString};
use crate::error::Result;
use crate::preserved::{Relationship, WORKSHEET_CHILD_ORDER};
use crate::style::{Alignment, Border, BorderStyle, CellStyle, CellXf, Color, Fill, Font, StyleRegistry};
use crate::utils::{column_to_letter, coordinate_from_row_col};
use crate::workbook::NamedRange;
use crate::worksheet::{CellData, ColumnDimension, Worksheet};

pub(crate) type PartOptions = FileOptions<'static, ExtendedFileOptions>;

/// Cells of one sheet in row-major order.
pub(crate) type SortedCells<'a> = Vec<((u32, u32), &'a CellData)>;

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const THEME_PATH: &str = "xl/theme/theme1.xml";

/// Escape text for use in XML content and attribute values.
pub fn escape_xml(s: &str) -> std::borrow::Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return std::borrow::Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    std::borrow::Cow::Owned(out)
}

/// Assign shared string indexes in first-seen order across all sheets.
pub(crate) fn collect_shared_strings(
    sheets: &[SortedCells<'_>],
) -> (Vec<InternedString>, HashMap<InternedString, u32>) {
    let mut strings = Vec::new();
    let mut index: HashMap<InternedString, u32> = HashMap::new();
    for cells in sheets {
        for (_, cell) in cells {
            if let CellValue::String(s) = &cell.value {
                if !index.contains_key(s) {
                    index.insert(s.clone(), strings.len() as u32);
                    strings.push(s.clone());
                }
            }
        }
    }
    (strings, index)
}

fn write_part<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    path: &str,
    content: impl AsRef<[u8]>,
) -> Result<()> {
    zip.start_file(path, options.clone())?;
    zip.write_all(content.as_ref())?;
    Ok(())
}

/// Write [Content_Types].xml.
pub(crate) fn write_content_types<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    sheet_count: usize,
    has_shared_strings: bool,
    has_theme: bool,
) -> Result<()> {
    let mut xml = String::with_capacity(1024 + sheet_count * 160);
    xml.push_str(XML_HEADER);
    xml.push_str(
        r#"
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
"#,
    );
    for idx in 1..=sheet_count {
        xml.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>\n",
            idx
        ));
    }
    if has_shared_strings {
        xml.push_str("<Override PartName=\"/xl/sharedStrings.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml\"/>\n");
    }
    if has_theme {
        xml.push_str(&format!(
            "<Override PartName=\"/{}\" ContentType=\"application/vnd.openxmlformats-officedocument.theme+xml\"/>\n",
            THEME_PATH
        ));
    }
    xml.push_str("</Types>");
    write_part(zip, options, "[Content_Types].xml", &xml)
}

/// Write _rels/.rels.
pub(crate) fn write_rels<W: Write + Seek>(zip: &mut ZipWriter<W>, options: &PartOptions) -> Result<()> {
    let xml = format!(
        r#"{}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#,
        XML_HEADER
    );
    write_part(zip, options, "_rels/.rels", &xml)
}

/// Write docProps/core.xml and docProps/app.xml.
pub(crate) fn write_doc_props<W: Write + Seek>(zip: &mut ZipWriter<W>, options: &PartOptions) -> Result<()> {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let core = format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:creator>sheetfmt</dc:creator>
<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>
<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>
</cp:coreProperties>"#,
        XML_HEADER
    );
    write_part(zip, options, "docProps/core.xml", &core)?;

    let app = format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>sheetfmt</Application></Properties>"#,
        XML_HEADER
    );
    write_part(zip, options, "docProps/app.xml", &app)
}

/// Write xl/workbook.xml.
pub(crate) fn write_workbook_xml<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    worksheets: &[Worksheet],
    active: usize,
    named_ranges: &[NamedRange],
) -> Result<()> {
    let mut xml = String::with_capacity(512 + worksheets.len() * 96);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!(
        "\n<workbook xmlns=\"{}\" xmlns:r=\"{}\">",
        MAIN_NS, REL_NS
    ));
    xml.push_str(&format!(
        "<bookViews><workbookView activeTab=\"{}\"/></bookViews><sheets>",
        active
    ));
    for (idx, ws) in worksheets.iter().enumerate() {
        xml.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\"",
            escape_xml(ws.title()),
            idx + 1
        ));
        if let Some(state) = ws.state.as_attr() {
            xml.push_str(&format!(" state=\"{}\"", state));
        }
        xml.push_str(&format!(" r:id=\"rId{}\"/>", idx + 1));
    }
    xml.push_str("</sheets>");

    if !named_ranges.is_empty() {
        xml.push_str("<definedNames>");
        for named in named_ranges {
            xml.push_str(&format!("<definedName name=\"{}\"", escape_xml(&named.name)));
            if let Some(sheet) = named.local_sheet_id {
                xml.push_str(&format!(" localSheetId=\"{}\"", sheet));
            }
            if named.hidden {
                xml.push_str(" hidden=\"1\"");
            }
            xml.push_str(&format!(">{}</definedName>", escape_xml(&named.value)));
        }
        xml.push_str("</definedNames>");
    }
    xml.push_str("</workbook>");
    write_part(zip, options, "xl/workbook.xml", &xml)
}

/// Write xl/_rels/workbook.xml.rels. Sheets take rId1..rIdN, then styles,
/// shared strings and theme follow at fixed offsets.
pub(crate) fn write_workbook_rels<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    sheet_count: usize,
    has_shared_strings: bool,
    has_theme: bool,
) -> Result<()> {
    let mut xml = String::with_capacity(512 + sheet_count * 160);
    xml.push_str(XML_HEADER);
    xml.push_str("\n<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n");
    for idx in 1..=sheet_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"worksheets/sheet{}.xml\"/>\n",
            idx, REL_NS, idx
        ));
    }
    xml.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"{}/styles\" Target=\"styles.xml\"/>\n",
        sheet_count + 1,
        REL_NS
    ));
    if has_shared_strings {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/sharedStrings\" Target=\"sharedStrings.xml\"/>\n",
            sheet_count + 2,
            REL_NS
        ));
    }
    if has_theme {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/theme\" Target=\"theme/theme1.xml\"/>\n",
            sheet_count + 3,
            REL_NS
        ));
    }
    xml.push_str("</Relationships>");
    write_part(zip, options, "xl/_rels/workbook.xml.rels", &xml)
}

/// Write the theme part carried over from the loaded package.
pub(crate) fn write_theme<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    theme: &[u8],
) -> Result<()> {
    write_part(zip, options, THEME_PATH, theme)
}

/// Write xl/worksheets/_rels/sheet{n}.xml.rels for the sheet's hyperlinks.
pub(crate) fn write_worksheet_rels<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    sheet_number: usize,
    relationships: &[Relationship],
) -> Result<()> {
    let mut xml = String::with_capacity(256 + relationships.len() * 160);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!("\n<Relationships xmlns=\"{}\">", PACKAGE_REL_NS));
    for rel in relationships {
        xml.push_str(&format!(
            "<Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"",
            escape_xml(&rel.id),
            escape_xml(&rel.rel_type),
            escape_xml(&rel.target)
        ));
        if rel.external {
            xml.push_str(" TargetMode=\"External\"");
        }
        xml.push_str("/>");
    }
    xml.push_str("</Relationships>");
    let path = format!("xl/worksheets/_rels/sheet{}.xml.rels", sheet_number);
    write_part(zip, options, &path, &xml)
}

/// Write xl/sharedStrings.xml.
pub(crate) fn write_shared_strings<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    strings: &[InternedString],
) -> Result<()> {
    let mut xml = String::with_capacity(256 + strings.iter().map(|s| s.len() + 16).sum::<usize>());
    xml.push_str(XML_HEADER);
    xml.push_str(&format!(
        "\n<sst xmlns=\"{}\" count=\"{}\" uniqueCount=\"{}\">",
        MAIN_NS,
        strings.len(),
        strings.len()
    ));
    for s in strings {
        let preserve = s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace);
        if preserve {
            xml.push_str("<si><t xml:space=\"preserve\">");
        } else {
            xml.push_str("<si><t>");
        }
        xml.push_str(&escape_xml(s));
        xml.push_str("</t></si>");
    }
    xml.push_str("</sst>");
    write_part(zip, options, "xl/sharedStrings.xml", &xml)
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Rgb(rgb) => format!("rgb=\"{}\"", escape_xml(rgb)),
        Color::Theme { index, tint: Some(tint) } => format!("theme=\"{}\" tint=\"{}\"", index, tint),
        Color::Theme { index, tint: None } => format!("theme=\"{}\"", index),
        Color::Indexed(index) => format!("indexed=\"{}\"", index),
        Color::Auto => "auto=\"1\"".to_string(),
    }
}

fn font_xml(font: &Font, out: &mut String) {
    out.push_str("<font>");
    if font.bold {
        out.push_str("<b/>");
    }
    if font.italic {
        out.push_str("<i/>");
    }
    if font.strike {
        out.push_str("<strike/>");
    }
    if let Some(underline) = &font.underline {
        if underline == "single" {
            out.push_str("<u/>");
        } else {
            out.push_str(&format!("<u val=\"{}\"/>", escape_xml(underline)));
        }
    }
    if let Some(vert_align) = &font.vert_align {
        out.push_str(&format!("<vertAlign val=\"{}\"/>", escape_xml(vert_align)));
    }
    if let Some(size) = font.size {
        out.push_str(&format!("<sz val=\"{}\"/>", size));
    }
    if let Some(color) = &font.color {
        out.push_str(&format!("<color {}/>", color_attrs(color)));
    }
    if let Some(name) = &font.name {
        out.push_str(&format!("<name val=\"{}\"/>", escape_xml(name)));
    }
    if let Some(family) = font.family {
        out.push_str(&format!("<family val=\"{}\"/>", family));
    }
    if let Some(scheme) = &font.scheme {
        out.push_str(&format!("<scheme val=\"{}\"/>", escape_xml(scheme)));
    }
    out.push_str("</font>");
}

fn fill_xml(fill: &Fill, out: &mut String) {
    out.push_str("<fill>");
    match &fill.pattern_type {
        Some(pattern) if fill.fg_color.is_some() || fill.bg_color.is_some() => {
            out.push_str(&format!("<patternFill patternType=\"{}\">", escape_xml(pattern)));
            if let Some(fg) = &fill.fg_color {
                out.push_str(&format!("<fgColor {}/>", color_attrs(fg)));
            }
            if let Some(bg) = &fill.bg_color {
                out.push_str(&format!("<bgColor {}/>", color_attrs(bg)));
            }
            out.push_str("</patternFill>");
        }
        Some(pattern) => out.push_str(&format!("<patternFill patternType=\"{}\"/>", escape_xml(pattern))),
        None => out.push_str("<patternFill/>"),
    }
    out.push_str("</fill>");
}

fn border_side_xml(tag: &str, side: &Option<BorderStyle>, out: &mut String) {
    match side {
        Some(BorderStyle { style, color: Some(color) }) => out.push_str(&format!(
            "<{tag} style=\"{}\"><color {}/></{tag}>",
            escape_xml(style),
            color_attrs(color)
        )),
        Some(BorderStyle { style, color: None }) => {
            out.push_str(&format!("<{tag} style=\"{}\"/>", escape_xml(style)))
        }
        None => out.push_str(&format!("<{tag}/>")),
    }
}

fn border_xml(border: &Border, out: &mut String) {
    out.push_str("<border>");
    border_side_xml("left", &border.left, out);
    border_side_xml("right", &border.right, out);
    border_side_xml("top", &border.top, out);
    border_side_xml("bottom", &border.bottom, out);
    border_side_xml("diagonal", &border.diagonal, out);
    out.push_str("</border>");
}

fn alignment_xml(alignment: &Alignment, out: &mut String) {
    out.push_str("<alignment");
    if let Some(h) = alignment.horizontal {
        out.push_str(&format!(" horizontal=\"{}\"", h));
    }
    if let Some(v) = alignment.vertical {
        out.push_str(&format!(" vertical=\"{}\"", v));
    }
    if let Some(rotation) = alignment.text_rotation {
        out.push_str(&format!(" textRotation=\"{}\"", rotation));
    }
    if alignment.wrap_text {
        out.push_str(" wrapText=\"1\"");
    }
    if let Some(indent) = alignment.indent {
        out.push_str(&format!(" indent=\"{}\"", indent));
    }
    if alignment.shrink_to_fit {
        out.push_str(" shrinkToFit=\"1\"");
    }
    out.push_str("/>");
}

fn cell_xf_xml(xf: &CellXf, out: &mut String) {
    out.push_str(&format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        xf.num_fmt_id, xf.font_id, xf.fill_id, xf.border_id
    ));
    for (flag, name) in [
        (xf.apply_number_format, "applyNumberFormat"),
        (xf.apply_font, "applyFont"),
        (xf.apply_fill, "applyFill"),
        (xf.apply_border, "applyBorder"),
        (xf.apply_alignment, "applyAlignment"),
    ] {
        if flag {
            out.push_str(&format!(" {}=\"1\"", name));
        }
    }
    match &xf.alignment {
        Some(alignment) => {
            out.push('>');
            alignment_xml(alignment, out);
            out.push_str("</xf>");
        }
        None => out.push_str("/>"),
    }
}

/// Write xl/styles.xml from the registry filled in while writing worksheets.
/// `preserved` holds raw `dxfs`, `tableStyles` and `colors` elements.
pub(crate) fn write_styles_xml<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    styles: &StyleRegistry,
    preserved: &[String],
) -> Result<()> {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!("\n<styleSheet xmlns=\"{}\">", MAIN_NS));

    if !styles.num_fmts.is_empty() {
        xml.push_str(&format!("<numFmts count=\"{}\">", styles.num_fmts.len()));
        for (id, code) in &styles.num_fmts {
            xml.push_str(&format!(
                "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                id,
                escape_xml(code)
            ));
        }
        xml.push_str("</numFmts>");
    }

    xml.push_str(&format!("<fonts count=\"{}\">", styles.fonts.len()));
    for font in &styles.fonts {
        font_xml(font, &mut xml);
    }
    xml.push_str("</fonts>");

    xml.push_str(&format!("<fills count=\"{}\">", styles.fills.len()));
    for fill in &styles.fills {
        fill_xml(fill, &mut xml);
    }
    xml.push_str("</fills>");

    xml.push_str(&format!("<borders count=\"{}\">", styles.borders.len()));
    for border in &styles.borders {
        border_xml(border, &mut xml);
    }
    xml.push_str("</borders>");

    xml.push_str("<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>");

    xml.push_str(&format!("<cellXfs count=\"{}\">", styles.cell_xfs.len()));
    for xf in &styles.cell_xfs {
        cell_xf_xml(xf, &mut xml);
    }
    xml.push_str("</cellXfs>");

    xml.push_str("<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>");
    for element in preserved {
        xml.push_str(element);
    }
    xml.push_str("</styleSheet>");
    write_part(zip, options, "xl/styles.xml", &xml)
}

fn style_index(style: Option<&std::sync::Arc<CellStyle>>, styles: &mut StyleRegistry) -> usize {
    style.map(|style| styles.get_or_add_cell_xf(style)).unwrap_or(0)
}

/// Append `<col>` elements, merging runs of adjacent columns with identical settings.
fn cols_xml(
    columns: &std::collections::BTreeMap<u32, ColumnDimension>,
    styles: &mut StyleRegistry,
    out: &mut String,
) {
    let mut runs: Vec<(u32, u32, &ColumnDimension)> = Vec::new();
    for (&column, dim) in columns {
        if dim.width.is_none() && !dim.hidden && dim.style.is_none() {
            continue;
        }
        match runs.last_mut() {
            Some((_, end, prev)) if *end + 1 == column && *prev == dim => *end = column,
            _ => runs.push((column, column, dim)),
        }
    }
    if runs.is_empty() {
        return;
    }

    out.push_str("<cols>");
    for (min, max, dim) in runs {
        out.push_str(&format!("<col min=\"{}\" max=\"{}\"", min, max));
        if let Some(width) = dim.width {
            out.push_str(&format!(" width=\"{}\" customWidth=\"1\"", width));
        }
        let xf = style_index(dim.style.as_ref(), styles);
        if xf != 0 {
            out.push_str(&format!(" style=\"{}\"", xf));
        }
        if dim.hidden {
            out.push_str(" hidden=\"1\"");
        }
        out.push_str("/>");
    }
    out.push_str("</cols>");
}

fn push_number(value: f64, out: &mut String) {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(value as i64));
    } else {
        let mut buf = ryu::Buffer::new();
        out.push_str(buf.format_finite(value));
    }
}

fn cell_xml(
    row: u32,
    column: u32,
    cell: &CellData,
    shared_strings: &HashMap<InternedString, u32>,
    styles: &mut StyleRegistry,
    out: &mut String,
) {
    out.push_str("<c r=\"");
    out.push_str(&column_to_letter(column));
    let mut row_buf = itoa::Buffer::new();
    out.push_str(row_buf.format(row));
    out.push('"');

    if let Some(style) = &cell.style {
        let xf = styles.get_or_add_cell_xf(style);
        if xf != 0 {
            out.push_str(&format!(" s=\"{}\"", xf));
        }
    }

    match &cell.value {
        CellValue::Empty => out.push_str("/>"),
        CellValue::Number(n) if !n.is_finite() => out.push_str("/>"),
        CellValue::Number(n) => {
            out.push_str("><v>");
            push_number(*n, out);
            out.push_str("</v></c>");
        }
        CellValue::String(s) => match shared_strings.get(s) {
            Some(idx) => out.push_str(&format!(" t=\"s\"><v>{}</v></c>", idx)),
            None => out.push_str(&format!(
                " t=\"inlineStr\"><is><t>{}</t></is></c>",
                escape_xml(s)
            )),
        },
        CellValue::Boolean(b) => {
            out.push_str(if *b { " t=\"b\"><v>1</v></c>" } else { " t=\"b\"><v>0</v></c>" })
        }
        CellValue::Date(d) => out.push_str(&format!(" t=\"d\"><v>{}</v></c>", escape_xml(d))),
        CellValue::Formula(f) => {
            let formula = f.strip_prefix('=').unwrap_or(f);
            out.push_str(&format!("><f>{}</f></c>", escape_xml(formula)));
        }
        CellValue::ArrayFormula { formula, range } => {
            let formula = formula.strip_prefix('=').unwrap_or(formula);
            out.push_str(&format!(
                "><f t=\"array\" ref=\"{}\">{}</f></c>",
                escape_xml(range),
                escape_xml(formula)
            ));
        }
        CellValue::Error(e) => out.push_str(&format!(" t=\"e\"><v>{}</v></c>", escape_xml(e))),
    }
}

fn dimension_ref(cells: &SortedCells<'_>) -> String {
    let Some(((first_row, _), _)) = cells.first() else {
        return "A1".to_string();
    };
    let (mut min_col, mut max_row, mut max_col) = (u32::MAX, *first_row, 0);
    for ((row, column), _) in cells {
        min_col = min_col.min(*column);
        max_col = max_col.max(*column);
        max_row = max_row.max(*row);
    }
    let start = coordinate_from_row_col(*first_row, min_col);
    let end = coordinate_from_row_col(max_row, max_col);
    if start == end {
        start
    } else {
        format!("{}:{}", start, end)
    }
}

/// Write xl/worksheets/sheet{n}.xml, registering cell styles as they are met.
///
/// Generated children and the sheet's preserved XML are interleaved in schema
/// order. Views, row format and margins get defaults when none were preserved.
#[allow(clippy::too_many_arguments)]
pub(crate) fn write_worksheet_xml<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    options: &PartOptions,
    worksheet: &Worksheet,
    cells: &SortedCells<'_>,
    sheet_number: usize,
    is_active: bool,
    shared_strings: &HashMap<InternedString, u32>,
    styles: &mut StyleRegistry,
) -> Result<()> {
    let preserved = &worksheet.preserved;
    let mut xml = String::with_capacity(1024 + cells.len() * 48);
    xml.push_str(XML_HEADER);
    xml.push_str(&format!("\n<worksheet xmlns=\"{}\" xmlns:r=\"{}\"", MAIN_NS, REL_NS));
    for (key, value) in &preserved.root_attributes {
        xml.push_str(&format!(" {}=\"{}\"", key, value));
    }
    xml.push('>');

    for &child in WORKSHEET_CHILD_ORDER {
        match child {
            "dimension" => xml.push_str(&format!("<dimension ref=\"{}\"/>", dimension_ref(cells))),
            "sheetViews" if !preserved.contains(child) => {
                if is_active {
                    xml.push_str("<sheetViews><sheetView tabSelected=\"1\" workbookViewId=\"0\"/></sheetViews>");
                } else {
                    xml.push_str("<sheetViews><sheetView workbookViewId=\"0\"/></sheetViews>");
                }
            }
            "sheetFormatPr" if !preserved.contains(child) => {
                xml.push_str("<sheetFormatPr defaultRowHeight=\"15\"/>");
            }
            "cols" => cols_xml(&worksheet.column_dimensions, styles, &mut xml),
            "sheetData" => sheet_data_xml(worksheet, cells, shared_strings, styles, &mut xml),
            "mergeCells" => {
                let merged = worksheet.merged_cells();
                if !merged.is_empty() {
                    xml.push_str(&format!("<mergeCells count=\"{}\">", merged.len()));
                    for range in merged {
                        xml.push_str(&format!("<mergeCell ref=\"{}\"/>", range));
                    }
                    xml.push_str("</mergeCells>");
                }
            }
            "pageMargins" if !preserved.contains(child) => {
                xml.push_str("<pageMargins left=\"0.7\" right=\"0.7\" top=\"0.75\" bottom=\"0.75\" header=\"0.3\" footer=\"0.3\"/>");
            }
            _ => {
                for element in preserved.elements_named(child) {
                    xml.push_str(&element.xml);
                }
            }
        }
    }
    xml.push_str("</worksheet>");

    let path = format!("xl/worksheets/sheet{}.xml", sheet_number);
    write_part(zip, options, &path, &xml)?;
    if !preserved.hyperlinks.is_empty() {
        write_worksheet_rels(zip, options, sheet_number, &preserved.hyperlinks)?;
    }
    Ok(())
}

fn sheet_data_xml(
    worksheet: &Worksheet,
    cells: &SortedCells<'_>,
    shared_strings: &HashMap<InternedString, u32>,
    styles: &mut StyleRegistry,
    xml: &mut String,
) {
    // Rows carrying only dimensions are written alongside rows with cells.
    let rows: BTreeSet<u32> = worksheet
        .row_dimensions
        .keys()
        .copied()
        .chain(cells.iter().map(|((row, _), _)| *row))
        .collect();

    xml.push_str("<sheetData>");
    let mut next_cell = 0;
    for row in rows {
        xml.push_str("<row r=\"");
        let mut buf = itoa::Buffer::new();
        xml.push_str(buf.format(row));
        xml.push('"');
        if let Some(dim) = worksheet.row_dimension(row) {
            let xf = style_index(dim.style.as_ref(), styles);
            if xf != 0 {
                xml.push_str(&format!(" s=\"{}\" customFormat=\"1\"", xf));
            }
            if let Some(height) = dim.height {
                xml.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
            }
            if dim.hidden {
                xml.push_str(" hidden=\"1\"");
            }
        }

        let start = next_cell;
        while next_cell < cells.len() && cells[next_cell].0 .0 == row {
            next_cell += 1;
        }
        if start == next_cell {
            xml.push_str("/>");
            continue;
        }
        xml.push('>');
        for ((r, c), cell) in &cells[start..next_cell] {
            cell_xml(*r, *c, cell, shared_strings, styles, xml);
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData>");
}
