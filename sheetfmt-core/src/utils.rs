//! Cell coordinates, column labels and rectangular ranges.

use std::fmt;

use crate::error::{Result, SheetfmtError};

/// Maximum column number in Excel (XFD = 16384).
pub const MAX_COLUMN: u32 = 16384;
/// Maximum row number in Excel.
pub const MAX_ROW: u32 = 1_048_576;

/// Parse a cell reference from bytes (e.g. b"A1", b"AB123") into (row, column), both 1-indexed.
#[inline]
pub fn parse_coordinate_bytes(bytes: &[u8]) -> Option<(u32, u32)> {
    let split = bytes.iter().position(|b| !b.is_ascii_alphabetic())?;
    if split == 0 {
        return None;
    }

    let mut column: u32 = 0;
    for &b in &bytes[..split] {
        let digit = u32::from(b.to_ascii_uppercase() - b'A' + 1);
        column = column.checked_mul(26)?.checked_add(digit)?;
        if column > MAX_COLUMN {
            return None;
        }
    }

    let row = parse_u32_bytes(&bytes[split..])?;
    if row == 0 || row > MAX_ROW {
        return None;
    }

    Some((row, column))
}

/// Parse a cell reference (e.g. "A1", "$B$2") into (row, column).
pub fn parse_coordinate(coord: &str) -> Result<(u32, u32)> {
    let trimmed = coord.trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != '$').collect();
    parse_coordinate_bytes(cleaned.as_bytes()).ok_or_else(|| {
        SheetfmtError::InvalidCoordinate(format!("Invalid coordinate: {}", trimmed))
    })
}

/// Parse a u32 directly from bytes without string allocation.
#[inline]
pub fn parse_u32_bytes(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() {
        return None;
    }
    let mut result: u32 = 0;
    for &b in bytes {
        if !b.is_ascii_digit() {
            return None;
        }
        result = result.checked_mul(10)?.checked_add(u32::from(b - b'0'))?;
    }
    Some(result)
}

/// Parse an f64 from bytes, with a fast path for plain integers.
#[inline]
pub fn parse_f64_bytes(bytes: &[u8]) -> Option<f64> {
    if !bytes.is_empty() && bytes.len() < 16 && bytes.iter().all(u8::is_ascii_digit) {
        let mut result: f64 = 0.0;
        for &b in bytes {
            result = result * 10.0 + f64::from(b - b'0');
        }
        return Some(result);
    }
    std::str::from_utf8(bytes).ok()?.trim().parse().ok()
}

/// Convert column letters ("A", "AB", "XFD") to a 1-based column index.
pub fn letter_to_column(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(SheetfmtError::InvalidCoordinate(
            "Empty column letters".to_string(),
        ));
    }

    let mut result: u32 = 0;
    for &b in letters.as_bytes() {
        if !b.is_ascii_alphabetic() {
            return Err(SheetfmtError::InvalidCoordinate(format!(
                "Invalid character in column: {}",
                b as char
            )));
        }
        let digit = u32::from(b.to_ascii_uppercase() - b'A' + 1);
        result = result
            .checked_mul(26)
            .and_then(|r| r.checked_add(digit))
            .filter(|r| *r <= MAX_COLUMN)
            .ok_or_else(|| {
                SheetfmtError::InvalidCoordinate(format!(
                    "Column '{}' exceeds Excel maximum (XFD = {})",
                    letters, MAX_COLUMN
                ))
            })?;
    }

    Ok(result)
}

/// Convert a 1-based column index to its label (1 -> "A", 28 -> "AB").
pub fn column_to_letter(column: u32) -> String {
    let mut letters = Vec::with_capacity(3);
    let mut col = column;

    while col > 0 {
        col -= 1;
        letters.push(b'A' + (col % 26) as u8);
        col /= 26;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Create a cell reference from row and column (1-indexed).
pub fn coordinate_from_row_col(row: u32, column: u32) -> String {
    let mut coord = column_to_letter(column);
    coord.push_str(itoa::Buffer::new().format(row));
    coord
}

/// An inclusive rectangular block of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub min_row: u32,
    pub min_col: u32,
    pub max_row: u32,
    pub max_col: u32,
}

impl CellRange {
    /// Build a range from two corners in any order.
    pub fn new(start: (u32, u32), end: (u32, u32)) -> Self {
        CellRange {
            min_row: start.0.min(end.0),
            min_col: start.1.min(end.1),
            max_row: start.0.max(end.0),
            max_col: start.1.max(end.1),
        }
    }

    /// Parse "A1:B10". A single reference ("C3") yields a one-cell range.
    pub fn parse(range: &str) -> Result<Self> {
        match range.split_once(':') {
            Some((start, end)) => Ok(CellRange::new(
                parse_coordinate(start)?,
                parse_coordinate(end)?,
            )),
            None => {
                let coord = parse_coordinate(range)?;
                Ok(CellRange::new(coord, coord))
            }
        }
    }

    /// Top-left cell of the range.
    pub fn anchor(&self) -> (u32, u32) {
        (self.min_row, self.min_col)
    }

    pub fn contains(&self, row: u32, column: u32) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&column)
    }

    pub fn intersects(&self, other: &CellRange) -> bool {
        self.min_row <= other.max_row
            && other.min_row <= self.max_row
            && self.min_col <= other.max_col
            && other.min_col <= self.max_col
    }

    /// Every (row, column) in the range, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.min_row..=self.max_row)
            .flat_map(move |row| (self.min_col..=self.max_col).map(move |col| (row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            coordinate_from_row_col(self.min_row, self.min_col),
            coordinate_from_row_col(self.max_row, self.max_col)
        )
    }
}

/// Parse a range reference (e.g., "A1:B10") into start and end coordinates.
pub fn parse_range(range: &str) -> Result<((u32, u32), (u32, u32))> {
    let (start, end) = range.split_once(':').ok_or_else(|| {
        SheetfmtError::InvalidCoordinate(format!("Invalid range format: {}", range))
    })?;
    Ok((parse_coordinate(start)?, parse_coordinate(end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("A1").unwrap(), (1, 1));
        assert_eq!(parse_coordinate("B2").unwrap(), (2, 2));
        assert_eq!(parse_coordinate("AA1").unwrap(), (1, 27));
        assert_eq!(parse_coordinate("ab10").unwrap(), (10, 28));
        assert_eq!(parse_coordinate("$K$19").unwrap(), (19, 11));
        assert_eq!(parse_coordinate("XFD1048576").unwrap(), (1048576, 16384));
    }

    #[test]
    fn test_parse_coordinate_errors() {
        assert!(parse_coordinate("").is_err());
        assert!(parse_coordinate("A").is_err());
        assert!(parse_coordinate("1").is_err());
        assert!(parse_coordinate("A0").is_err());
        assert!(parse_coordinate("XFE1").is_err());
        assert!(parse_coordinate("A1048577").is_err());
        assert!(parse_coordinate("AAAAAAAAAA1").is_err());
        assert!(parse_coordinate("A99999999999999999999").is_err());
    }

    #[test]
    fn test_column_labels() {
        assert_eq!(column_to_letter(1), "A");
        assert_eq!(column_to_letter(23), "W");
        assert_eq!(column_to_letter(26), "Z");
        assert_eq!(column_to_letter(27), "AA");
        assert_eq!(column_to_letter(16384), "XFD");
        assert_eq!(letter_to_column("w").unwrap(), 23);
        assert_eq!(letter_to_column("XFD").unwrap(), 16384);
    }

    #[test]
    fn test_column_roundtrip() {
        for col in 1..=MAX_COLUMN {
            assert_eq!(letter_to_column(&column_to_letter(col)).unwrap(), col);
        }
    }

    #[test]
    fn test_letter_to_column_errors() {
        assert!(letter_to_column("").is_err());
        assert!(letter_to_column("A1").is_err());
        assert!(letter_to_column("XFE").is_err());
        assert!(letter_to_column("ZZZZZZZZZ").is_err());
    }

    #[test]
    fn test_cell_range() {
        let range = CellRange::parse("K19:W19").unwrap();
        assert_eq!(range.anchor(), (19, 11));
        assert_eq!(range.to_string(), "K19:W19");
        assert_eq!(range.cells().count(), 13);
        assert!(range.contains(19, 23));
        assert!(!range.contains(18, 11));
        assert!(range.intersects(&CellRange::parse("A19:K20").unwrap()));
        assert!(!range.intersects(&CellRange::parse("A1:J30").unwrap()));
        assert_eq!(CellRange::parse("C3").unwrap().cells().count(), 1);
    }

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("A1:B10").unwrap(), ((1, 1), (10, 2)));
        assert!(parse_range("A1").is_err());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_u32_bytes(b"4294967295"), Some(u32::MAX));
        assert!(parse_u32_bytes(b"99999999999999999999").is_none());
        assert_eq!(parse_f64_bytes(b"42"), Some(42.0));
        assert_eq!(parse_f64_bytes(b"1.5E+3"), Some(1500.0));
        assert_eq!(parse_f64_bytes(b"abc"), None);
    }
}
