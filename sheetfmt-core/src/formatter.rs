//! The sheet formatting pass.
//!
//! `format_sheet` applies [`SheetLayout::STANDARD`] to a worksheet in five
//! ordered steps: row geometry, column geometry, body styling, the merged note
//! row and the summary row. The row count is taken once by the caller and is
//! the bound for every range; ranges that end before they start are skipped.

use tracing::debug;

use crate::cell::CellValue;
use crate::error::Result;
use crate::layout::SheetLayout;
use crate::style::{Alignment, Border, BorderStyle, Font, HorizontalAlignment, VerticalAlignment};
use crate::utils::CellRange;
use crate::workbook::Workbook;
use crate::worksheet::Worksheet;

/// Format `worksheet`, treating it as holding `row_count` populated rows.
pub fn format_sheet(worksheet: &mut Worksheet, row_count: u32) -> Result<()> {
    apply_layout(worksheet, row_count, SheetLayout::standard())
}

/// Format the active sheet of a workbook. Returns the row count used.
pub fn format_active_sheet(workbook: &mut Workbook) -> Result<u32> {
    let worksheet = workbook.active_mut()?;
    let row_count = worksheet.max_row();
    debug!(sheet = worksheet.title(), row_count, "formatting active sheet");
    format_sheet(worksheet, row_count)?;
    Ok(row_count)
}

fn apply_layout(ws: &mut Worksheet, row_count: u32, layout: &SheetLayout) -> Result<()> {
    apply_row_geometry(ws, row_count, layout);
    apply_column_geometry(ws, layout)?;
    apply_body_styling(ws, row_count, layout);
    apply_note_row(ws, row_count, layout);
    apply_summary_row(ws, row_count, layout);
    Ok(())
}

fn thin_border() -> Border {
    Border::all(BorderStyle::thin())
}

fn apply_row_geometry(ws: &mut Worksheet, row_count: u32, layout: &SheetLayout) {
    for zone in layout.row_zones {
        for row in zone.rows(row_count) {
            let dim = ws.row_dimension_mut(row);
            dim.height = Some(zone.height);
            if zone.hide {
                dim.hidden = true;
            }
        }
    }
}

fn apply_column_geometry(ws: &mut Worksheet, layout: &SheetLayout) -> Result<()> {
    for rule in layout.column_rules()? {
        let dim = ws.column_dimension_mut(rule.column);
        dim.width = Some(rule.width);
        if rule.hidden {
            dim.hidden = true;
        }
    }
    Ok(())
}

fn apply_body_styling(ws: &mut Worksheet, row_count: u32, layout: &SheetLayout) {
    let font = Font::new().with_size(layout.body_font_size);
    let left = Alignment::wrapped(HorizontalAlignment::Left, VerticalAlignment::Center);
    let center = Alignment::wrapped(HorizontalAlignment::Center, VerticalAlignment::Center);
    let (first_col, last_col) = layout.body_columns;

    for row in layout.body_rows(row_count) {
        for column in first_col..=last_col {
            ws.set_cell_border(row, column, thin_border());
            ws.set_cell_font(row, column, font.clone());
            let alignment = if layout.aligns_left(row, column) { &left } else { &center };
            ws.set_cell_alignment(row, column, alignment.clone());

            if column == layout.numbering_column {
                if let Some(index) = layout.sequence_number(row) {
                    ws.set_cell_value(row, column, CellValue::from(index));
                }
            }
        }
    }
}

fn apply_note_row(ws: &mut Worksheet, row_count: u32, layout: &SheetLayout) {
    if row_count < 2 {
        return;
    }
    let note_row = row_count - 1;
    let (first_col, last_col) = layout.note_columns;
    ws.merge_cells(CellRange::new((note_row, first_col), (note_row, last_col)));

    ws.set_cell_font(note_row, first_col, Font::new().with_size(layout.body_font_size));
    ws.set_cell_alignment(
        note_row,
        first_col,
        Alignment::wrapped(HorizontalAlignment::Left, VerticalAlignment::Center),
    );
    ws.set_cell_border(note_row, first_col, thin_border());

    if note_row < layout.tall_row_threshold {
        ws.set_row_height(note_row, layout.tall_row_height);
    }
}

fn apply_summary_row(ws: &mut Worksheet, row_count: u32, layout: &SheetLayout) {
    if row_count < 1 {
        return;
    }
    // Read after the merge: merged placeholders widen the sheet.
    let last_col = ws.max_column();
    let font = Font::new()
        .with_size(layout.summary_font_size)
        .with_bold(true);

    for column in 1..=last_col {
        ws.set_cell_font(row_count, column, font.clone());
    }

    if row_count < layout.tall_row_threshold {
        ws.set_row_height(row_count, layout.tall_row_height);
    }
}
