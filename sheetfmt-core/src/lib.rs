//! Workbook model and fixed-layout sheet formatter for xlsx documents.
//!
//! A workbook is loaded into memory, the active sheet is run through
//! [`format_active_sheet`], and the result is written back out as a complete
//! xlsx package:
//!
//! ```no_run
//! use sheetfmt_core::{format_active_sheet, Workbook};
//!
//! let mut workbook = Workbook::load("report.xlsx")?;
//! format_active_sheet(&mut workbook)?;
//! workbook.save("processed_report.xlsx")?;
//! # Ok::<(), sheetfmt_core::SheetfmtError>(())
//! ```

pub mod cell;
pub mod error;
pub mod formatter;
pub mod formula;
pub mod layout;
pub mod preserved;
mod reader;
#[cfg(feature = "s3")]
pub mod s3;
pub mod style;
pub mod utils;
pub mod workbook;
pub mod worksheet;
mod writer;

pub use cell::{CellValue, InternedString};
pub use error::{Result, SheetfmtError};
pub use formatter::{format_active_sheet, format_sheet};
pub use formula::translate_formula;
pub use layout::{ColumnRule, RowBound, RowZone, SheetLayout};
pub use preserved::{PreservedElement, PreservedXml, Relationship};
#[cfg(feature = "s3")]
pub use s3::{BlobStore, S3Config};
pub use style::{
    Alignment, Border, BorderStyle, CellStyle, Color, Fill, Font, HorizontalAlignment,
    NumberFormat, VerticalAlignment,
};
pub use utils::{column_to_letter, letter_to_column, CellRange};
pub use workbook::{CompressionLevel, NamedRange, Workbook};
pub use worksheet::{CellData, ColumnDimension, RowDimension, SheetState, Worksheet};
pub use writer::escape_xml;

/// MIME type of an xlsx package.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
