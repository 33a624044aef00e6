//! Cell values.

use std::sync::Arc;

/// Shared-string text. Cells loaded from the same shared-string entry share one allocation.
pub type InternedString = Arc<str>;

/// The value held by a worksheet cell.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    /// No value. The cell may still carry a style.
    #[default]
    Empty,
    String(InternedString),
    Number(f64),
    Boolean(bool),
    /// ISO 8601 date stored with the `d` cell type.
    Date(String),
    /// Formula text without the leading `=`.
    Formula(String),
    /// Array (CSE) formula anchored on this cell and spilling over `range`.
    ArrayFormula { formula: String, range: String },
    /// Error literal such as `#N/A`.
    Error(String),
}

impl CellValue {
    /// Build a string value.
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        CellValue::String(Arc::from(s.as_ref()))
    }

    /// Whether the cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric view of the value, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}
