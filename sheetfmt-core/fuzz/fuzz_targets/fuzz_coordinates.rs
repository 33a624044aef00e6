#![no_main]

//! Coordinate, range and formula parsing must never panic, and labels must
//! round trip for every column the formatter can address.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sheetfmt_core::translate_formula;
use sheetfmt_core::utils::{
    column_to_letter, coordinate_from_row_col, letter_to_column, parse_coordinate,
    parse_coordinate_bytes, parse_range, MAX_COLUMN, MAX_ROW,
};

#[derive(Arbitrary, Debug)]
struct Input {
    text: String,
    raw: Vec<u8>,
    row: u32,
    column: u32,
}

fuzz_target!(|input: Input| {
    let _ = parse_coordinate(&input.text);
    let _ = parse_range(&input.text);
    let _ = letter_to_column(&input.text);
    let _ = translate_formula(&input.text, i64::from(input.row % 7) - 3, i64::from(input.column % 7) - 3);
    assert_eq!(translate_formula(&input.text, 0, 0), input.text);

    if let Some((row, column)) = parse_coordinate_bytes(&input.raw) {
        assert!((1..=MAX_ROW).contains(&row));
        assert!((1..=MAX_COLUMN).contains(&column));
    }

    let column = input.column % MAX_COLUMN + 1;
    let row = input.row % MAX_ROW + 1;
    let label = column_to_letter(column);
    assert_eq!(letter_to_column(&label).ok(), Some(column));
    assert_eq!(
        parse_coordinate(&coordinate_from_row_col(row, column)).ok(),
        Some((row, column))
    );
});
