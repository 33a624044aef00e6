use std::io::{Cursor, Read, Write};

use sheetfmt_core::{
    format_active_sheet, CellValue, Color, CompressionLevel, Fill, NumberFormat, Workbook,
};
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

#[test]
fn test_boolean_roundtrip() {
    let mut wb = Workbook::new();
    let ws = wb.create_sheet(Some("Test".to_string())).unwrap();
    ws.set_cell_value(1, 1, CellValue::Boolean(false));
    ws.set_cell_value(1, 2, CellValue::Boolean(true));

    let temp_file = NamedTempFile::new().unwrap();
    wb.save(temp_file.path()).unwrap();

    let loaded_wb = Workbook::load(temp_file.path()).unwrap();
    let loaded_ws = loaded_wb.get_sheet_by_name("Test").unwrap();

    assert_eq!(loaded_ws.get_cell_value(1, 1), Some(&CellValue::Boolean(false)));
    assert_eq!(loaded_ws.get_cell_value(1, 2), Some(&CellValue::Boolean(true)));
}

#[test]
fn test_load_missing_file() {
    assert!(Workbook::load("/nonexistent/dir/input.xlsx").is_err());
}

#[test]
fn test_load_rejects_non_zip() {
    assert!(Workbook::load_from_bytes(b"definitely not a zip archive").is_err());
}

#[test]
fn test_formatted_sheet_roundtrip() {
    let mut wb = Workbook::new();
    let ws = wb.create_sheet(Some("Report".to_string())).unwrap();
    for row in 1..=20 {
        ws.set_cell_value(row, 1, CellValue::string(format!("row {}", row)));
        ws.set_cell_value(row, 6, CellValue::Number(f64::from(row) * 1.5));
    }
    ws.set_cell_style(
        15,
        6,
        sheetfmt_core::CellStyle::new()
            .with_fill(Fill::solid(Color::rgb("FFFFFF00")))
            .with_number_format(NumberFormat::Custom("0.000".into())),
    );

    let rows = format_active_sheet(&mut wb).unwrap();
    assert_eq!(rows, 20);
    wb.set_compression(CompressionLevel::Default);

    let temp_file = NamedTempFile::new().unwrap();
    wb.save(temp_file.path()).unwrap();
    let loaded = Workbook::load(temp_file.path()).unwrap();
    let ws = loaded.active().unwrap();
    let original = wb.active().unwrap();

    for row in 1..=20 {
        assert_eq!(ws.row_dimension(row), original.row_dimension(row), "row {}", row);
        for col in 1..=23 {
            assert_eq!(
                ws.get_cell_style(row, col),
                original.get_cell_style(row, col),
                "style at ({}, {})",
                row,
                col
            );
            assert_eq!(ws.get_cell_value(row, col), original.get_cell_value(row, col));
        }
    }
    for col in 1..=25 {
        assert_eq!(ws.column_dimension(col), original.column_dimension(col), "column {}", col);
    }
    assert_eq!(ws.merged_cells(), original.merged_cells());
    assert_eq!(ws.get_cell_value(14, 2), Some(&CellValue::Number(1.0)));
    assert_eq!(ws.get_cell_value(18, 2), Some(&CellValue::Number(5.0)));

    let kept = ws.get_cell_style(15, 6).unwrap();
    assert_eq!(kept.fill, Some(Fill::solid(Color::rgb("FFFFFF00"))));
    assert_eq!(kept.number_format, Some(NumberFormat::Custom("0.000".into())));
}

#[test]
fn test_only_active_sheet_is_formatted() {
    let mut wb = Workbook::new();
    wb.create_sheet(Some("Untouched".to_string()))
        .unwrap()
        .set_cell_value(20, 1, CellValue::from("keep"));
    wb.create_sheet(Some("Target".to_string()))
        .unwrap()
        .set_cell_value(20, 1, CellValue::from("format me"));
    wb.set_active(1);

    let bytes = wb.save_to_bytes().unwrap();
    let mut loaded = Workbook::load_from_bytes(&bytes).unwrap();
    format_active_sheet(&mut loaded).unwrap();

    let untouched = loaded.get_sheet_by_name("Untouched").unwrap();
    assert!(untouched.row_dimensions.is_empty());
    assert!(untouched.column_dimensions.is_empty());
    assert!(untouched.merged_cells().is_empty());

    let target = loaded.get_sheet_by_name("Target").unwrap();
    assert_eq!(target.merged_cells().len(), 1);
    assert_eq!(target.row_dimension(2).and_then(|d| d.height), Some(15.0));
}

const THEME_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements/></a:theme>"#;

/// A package as a spreadsheet application would write it: shared formulas,
/// frozen panes, print setup, conditional formats and a hyperlink.
fn authored_package() -> Vec<u8> {
    let mut rows = String::new();
    for row in 1..=20 {
        rows.push_str(&format!("<row r=\"{row}\"><c r=\"A{row}\"><v>{row}</v></c>"));
        match row {
            1 => rows.push_str(
                r#"<c r="B1"><f t="shared" ref="B1:B3" si="0">A1*2</f><v>2</v></c><c r="C1"><f t="array" ref="C1:C2">A1:A2*10</f><v>10</v></c>"#,
            ),
            2 | 3 => rows.push_str(&format!("<c r=\"B{row}\"><f t=\"shared\" si=\"0\"/><v>{}</v></c>", row * 2)),
            _ => {}
        }
        rows.push_str("</row>");
    }
    let sheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac" mc:Ignorable="x14ac"><sheetPr><pageSetUpPr fitToPage="1"/></sheetPr><dimension ref="A1:C20"/><sheetViews><sheetView tabSelected="1" zoomScale="90" workbookViewId="0"><pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/><selection pane="bottomLeft" activeCell="A2" sqref="A2"/></sheetView></sheetViews><sheetFormatPr defaultRowHeight="15" x14ac:dyDescent="0.25"/><cols><col min="5" max="5" width="20" customWidth="1" style="1"/></cols><sheetData>{rows}</sheetData><conditionalFormatting sqref="A1:A20"><cfRule type="cellIs" dxfId="0" priority="1" operator="greaterThan"><formula>10</formula></cfRule></conditionalFormatting><hyperlinks><hyperlink ref="A1" r:id="rId1"/></hyperlinks><pageMargins left="0.25" right="0.25" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><pageSetup orientation="landscape" fitToHeight="0" r:id="rId2"/><headerFooter><oddFooter>Page &amp;P</oddFooter></headerFooter><drawing r:id="rId3"/></worksheet>"#
    );
    let parts: [(&str, String); 9] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/></Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Authored" sheetId="1" r:id="rId1"/></sheets></workbook>"#
                .to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="theme/theme1.xml"/></Relationships>"#
                .to_string(),
        ),
        (
            "xl/styles.xml",
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" applyFont="1"/></cellXfs><dxfs count="1"><dxf><font><color rgb="FF9C0006"/></font><fill><patternFill><bgColor rgb="FFFFC7CE"/></patternFill></fill></dxf></dxfs></styleSheet>"#
                .to_string(),
        ),
        ("xl/theme/theme1.xml", THEME_XML.to_string()),
        ("xl/worksheets/sheet1.xml", sheet),
        (
            "xl/worksheets/_rels/sheet1.xml.rels",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/report" TargetMode="External"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/printerSettings" Target="../printerSettings/printerSettings1.bin"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing" Target="../drawings/drawing1.xml"/></Relationships>"#
                .to_string(),
        ),
        ("docProps/app.xml", "<Properties/>".to_string()),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn read_part(package: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(package)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut out = String::new();
    part.read_to_string(&mut out).unwrap();
    out
}

#[test]
fn test_shared_and_array_formulas_survive_formatting() {
    let mut wb = Workbook::load_from_bytes(&authored_package()).unwrap();
    {
        let ws = wb.active().unwrap();
        assert_eq!(ws.get_cell_value(2, 2), Some(&CellValue::Formula("A2*2".into())));
    }
    format_active_sheet(&mut wb).unwrap();

    let saved = wb.save_to_bytes().unwrap();
    let reloaded = Workbook::load_from_bytes(&saved).unwrap();
    let ws = reloaded.active().unwrap();
    assert_eq!(ws.get_cell_value(1, 2), Some(&CellValue::Formula("A1*2".into())));
    assert_eq!(ws.get_cell_value(2, 2), Some(&CellValue::Formula("A2*2".into())));
    assert_eq!(ws.get_cell_value(3, 2), Some(&CellValue::Formula("A3*2".into())));
    assert_eq!(
        ws.get_cell_value(1, 3),
        Some(&CellValue::ArrayFormula { formula: "A1:A2*10".into(), range: "C1:C2".into() })
    );

    let sheet = read_part(&saved, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<f t="array" ref="C1:C2">A1:A2*10</f>"#));
}

#[test]
fn test_sheet_settings_survive_formatting() {
    let mut wb = Workbook::load_from_bytes(&authored_package()).unwrap();
    format_active_sheet(&mut wb).unwrap();
    let saved = wb.save_to_bytes().unwrap();

    let sheet = read_part(&saved, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"state="frozen""#), "{}", sheet);
    assert!(sheet.contains(r#"<pageSetup orientation="landscape" fitToHeight="0"/>"#), "{}", sheet);
    assert!(sheet.contains(r#"<oddFooter>Page &amp;P</oddFooter>"#));
    assert!(sheet.contains(r#"<hyperlink ref="A1" r:id="rId1"/>"#));
    assert!(sheet.contains(r#"xmlns:x14ac="http://schemas.microsoft.com/office/spreadsheetml/2009/9/ac""#));
    assert!(sheet.contains(r#"mc:Ignorable="x14ac""#));
    assert!(!sheet.contains("<drawing"));
    // Exactly one of each defaulted element.
    assert_eq!(sheet.matches("<sheetViews>").count(), 1);
    assert_eq!(sheet.matches("<pageMargins ").count(), 1);
    assert!(sheet.contains(r#"<pageMargins left="0.25""#));

    let order = [
        "<sheetPr>",
        "<dimension ",
        "<sheetViews>",
        "<sheetFormatPr ",
        "<cols>",
        "<sheetData>",
        "<mergeCells ",
        "<conditionalFormatting ",
        "<hyperlinks>",
        "<pageMargins ",
        "<pageSetup ",
        "<headerFooter>",
    ];
    let positions: Vec<usize> = order
        .iter()
        .map(|tag| sheet.find(tag).unwrap_or_else(|| panic!("{} missing", tag)))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", positions);

    let rels = read_part(&saved, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains(r#"Id="rId1""#));
    assert!(rels.contains(r#"Target="https://example.com/report" TargetMode="External""#));
    assert!(!rels.contains("printerSettings"));

    let styles = read_part(&saved, "xl/styles.xml");
    assert!(styles.contains("FFFFC7CE"));
    assert!(styles.find("<cellStyles ").unwrap() < styles.find("<dxfs").unwrap());

    assert_eq!(read_part(&saved, "xl/theme/theme1.xml"), THEME_XML);
    assert!(read_part(&saved, "[Content_Types].xml").contains("/xl/theme/theme1.xml"));
    assert!(read_part(&saved, "xl/_rels/workbook.xml.rels").contains(r#"Target="theme/theme1.xml""#));

    let reloaded = Workbook::load_from_bytes(&saved).unwrap();
    let ws = reloaded.active().unwrap();
    assert!(ws.preserved.contains("pageSetup"));
    let styled_column = ws.column_dimension(5).and_then(|dim| dim.style.as_ref()).unwrap();
    assert!(styled_column.font.as_ref().unwrap().bold);
}
