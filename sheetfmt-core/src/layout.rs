//! The fixed formatting table applied to every processed sheet.
//!
//! All constants the formatter uses live here, so the table can be checked on
//! its own without running a formatting pass.

use crate::error::Result;
use crate::utils::letter_to_column;

/// Last row of a zone, either fixed or counted back from the sheet's row count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowBound {
    Fixed(u32),
    /// `row_count - n`.
    FromLast(u32),
}

impl RowBound {
    /// Resolve against the row count. `None` means the bound falls before row 1.
    pub fn resolve(self, row_count: u32) -> Option<u32> {
        match self {
            RowBound::Fixed(row) => Some(row),
            RowBound::FromLast(n) => row_count.checked_sub(n).filter(|row| *row > 0),
        }
    }
}

/// An inclusive block of rows that all receive the same height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowZone {
    pub start: u32,
    pub end: RowBound,
    pub height: f64,
    /// When set, rows are also hidden. Unset zones leave the hidden flag alone.
    pub hide: bool,
}

impl RowZone {
    /// Rows covered for a sheet of `row_count` rows. Empty when end < start.
    pub fn rows(&self, row_count: u32) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end.resolve(row_count).unwrap_or(0)
    }
}

/// Width and visibility assigned to one column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnRule {
    pub column: u32,
    pub width: f64,
    pub hidden: bool,
}

/// The complete formatting table.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    /// Row height zones, applied in order.
    pub row_zones: &'static [RowZone],
    /// Explicit widths by column label. A width of exactly 0 also hides the column.
    pub column_widths: &'static [(&'static str, f64)],
    /// Columns forced to width 0 and hidden, applied after `column_widths`.
    pub hidden_columns: &'static [&'static str],
    /// First and last row of the body region.
    pub body_rows: (u32, RowBound),
    /// First and last column of the body region.
    pub body_columns: (u32, u32),
    pub body_font_size: f64,
    /// Body cells at or right of this column, and at or below `left_align_first_row`, align left.
    pub left_align_first_column: u32,
    pub left_align_first_row: u32,
    /// Column receiving the running index, and the row holding index 1.
    pub numbering_column: u32,
    pub numbering_first_row: u32,
    /// Columns of the merged note on the second-to-last row.
    pub note_columns: (u32, u32),
    pub summary_font_size: f64,
    /// Height given to the note and summary rows when they sit above `tall_row_threshold`.
    pub tall_row_height: f64,
    pub tall_row_threshold: u32,
}

impl SheetLayout {
    /// The layout every processed sheet receives.
    pub const STANDARD: SheetLayout = SheetLayout {
        row_zones: &[
            RowZone { start: 2, end: RowBound::Fixed(7), height: 15.0, hide: false },
            RowZone { start: 8, end: RowBound::Fixed(12), height: 0.0, hide: true },
            RowZone { start: 14, end: RowBound::FromLast(2), height: 27.0, hide: false },
        ],
        column_widths: &[
            ("B", 3.0),
            ("E", 9.8),
            ("F", 13.0),
            ("G", 26.3),
            ("I", 6.0),
            ("J", 0.0),
            ("L", 3.2),
            ("M", 2.7),
            ("N", 3.0),
            ("Q", 2.7),
            ("U", 7.3),
            ("V", 5.0),
            ("W", 5.5),
        ],
        hidden_columns: &["C", "P", "R", "S", "T", "X", "Y"],
        body_rows: (13, RowBound::FromLast(2)),
        body_columns: (2, 23),
        body_font_size: 10.0,
        left_align_first_column: 5,
        left_align_first_row: 14,
        numbering_column: 2,
        numbering_first_row: 14,
        note_columns: (11, 23),
        summary_font_size: 16.0,
        tall_row_height: 27.0,
        tall_row_threshold: 14,
    };

    pub fn standard() -> &'static SheetLayout {
        &Self::STANDARD
    }

    /// Column assignments in application order: the width table first, then the forced-hidden list.
    pub fn column_rules(&self) -> Result<Vec<ColumnRule>> {
        let mut rules = Vec::with_capacity(self.column_widths.len() + self.hidden_columns.len());
        for (label, width) in self.column_widths {
            rules.push(ColumnRule {
                column: letter_to_column(label)?,
                width: *width,
                hidden: *width == 0.0,
            });
        }
        for label in self.hidden_columns {
            rules.push(ColumnRule {
                column: letter_to_column(label)?,
                width: 0.0,
                hidden: true,
            });
        }
        Ok(rules)
    }

    /// Body rows for a sheet of `row_count` rows.
    pub fn body_rows(&self, row_count: u32) -> std::ops::RangeInclusive<u32> {
        RowZone {
            start: self.body_rows.0,
            end: self.body_rows.1,
            height: 0.0,
            hide: false,
        }
        .rows(row_count)
    }

    /// Index written to the numbering column on `row`.
    pub fn sequence_number(&self, row: u32) -> Option<u32> {
        (row >= self.numbering_first_row).then(|| row - (self.numbering_first_row - 1))
    }

    /// Whether a body cell aligns left (otherwise centre).
    pub fn aligns_left(&self, row: u32, column: u32) -> bool {
        column >= self.left_align_first_column && row >= self.left_align_first_row
    }
}
