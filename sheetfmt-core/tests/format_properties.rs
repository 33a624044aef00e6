use proptest::prelude::*;
use sheetfmt_core::{format_sheet, CellValue, HorizontalAlignment, SheetLayout, Worksheet};

fn sheet_with_rows(rows: u32) -> Worksheet {
    let mut ws = Worksheet::new("Sheet1");
    for row in 1..=rows {
        ws.set_cell_value(row, 1, CellValue::from("data"));
    }
    ws
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn numbering_runs_from_one(rows in 1u32..80) {
        let mut ws = sheet_with_rows(rows);
        format_sheet(&mut ws, rows).unwrap();

        for row in 14..=rows.saturating_sub(2) {
            prop_assert_eq!(
                ws.get_cell_value(row, 2),
                Some(&CellValue::Number(f64::from(row - 13)))
            );
        }
        prop_assert!(ws.get_cell_value(13, 2).map_or(true, |v| v.is_empty()));
    }

    #[test]
    fn body_rows_are_styled_and_others_untouched(rows in 1u32..60) {
        let mut ws = sheet_with_rows(rows);
        format_sheet(&mut ws, rows).unwrap();
        let body_end = rows.saturating_sub(2);

        for row in 1..=rows {
            for col in 2..=23 {
                let bordered = ws
                    .get_cell_style(row, col)
                    .and_then(|s| s.border.as_ref())
                    .is_some();
                let in_body = (13..=body_end).contains(&row);
                let is_note_anchor = rows >= 2 && row == rows - 1 && col == 11;
                prop_assert_eq!(bordered, in_body || is_note_anchor, "({}, {})", row, col);
            }
        }
    }

    #[test]
    fn alignment_follows_partition(rows in 15u32..60) {
        let mut ws = sheet_with_rows(rows);
        format_sheet(&mut ws, rows).unwrap();
        let layout = SheetLayout::standard();

        for row in 13..=rows - 2 {
            for col in 2..=23 {
                let align = ws.get_cell_style(row, col).and_then(|s| s.alignment.as_ref()).unwrap();
                let expected = if col >= 5 && row >= 14 {
                    HorizontalAlignment::Left
                } else {
                    HorizontalAlignment::Center
                };
                prop_assert_eq!(align.horizontal, Some(expected));
                prop_assert!(align.wrap_text);
                prop_assert_eq!(layout.aligns_left(row, col), expected == HorizontalAlignment::Left);
            }
        }
    }

    #[test]
    fn note_and_summary_rows(rows in 1u32..60) {
        let mut ws = sheet_with_rows(rows);
        format_sheet(&mut ws, rows).unwrap();

        if rows >= 2 {
            let note = rows - 1;
            prop_assert_eq!(ws.merged_cells().len(), 1);
            prop_assert_eq!(ws.merged_cells()[0].to_string(), format!("K{}:W{}", note, note));
            let expected = (note < 14).then_some(27.0);
            prop_assert_eq!(ws.row_dimension(note).and_then(|d| d.height), expected);
            prop_assert_eq!(
                ws.row_dimension(note).map_or(false, |d| d.hidden),
                (8..=12).contains(&note)
            );
        } else {
            prop_assert!(ws.merged_cells().is_empty());
        }

        let last_col = if rows >= 2 { 23 } else { 1 };
        for col in 1..=last_col {
            let font = ws.get_cell_style(rows, col).and_then(|s| s.font.as_ref()).unwrap();
            prop_assert_eq!(font.size, Some(16.0));
            prop_assert!(font.bold);
        }
        prop_assert!(ws.get_cell(rows, last_col + 1).is_none());

        let expected = (rows < 14).then_some(27.0);
        prop_assert_eq!(ws.row_dimension(rows).and_then(|d| d.height), expected);
    }

    #[test]
    fn formatting_twice_matches_once(rows in 1u32..40) {
        let mut once = sheet_with_rows(rows);
        format_sheet(&mut once, rows).unwrap();
        let mut twice = once.clone();
        format_sheet(&mut twice, rows).unwrap();

        prop_assert_eq!(&once.row_dimensions, &twice.row_dimensions);
        prop_assert_eq!(&once.column_dimensions, &twice.column_dimensions);
        prop_assert_eq!(once.merged_cells(), twice.merged_cells());
        for ((row, col), cell) in once.sorted_cells() {
            prop_assert_eq!(Some(cell), twice.get_cell(row, col));
        }
    }
}
