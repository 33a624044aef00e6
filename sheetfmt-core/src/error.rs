//! Error types for workbook I/O and formatting.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SheetfmtError>;

/// Errors raised while reading, formatting or writing a workbook.
#[derive(Debug, Error)]
pub enum SheetfmtError {
    /// Underlying filesystem or stream failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The package is not a readable ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A SpreadsheetML part could not be parsed.
    #[error("{0}")]
    ParseError(String),

    /// The package is structurally not an xlsx workbook.
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),

    /// A cell reference or range could not be parsed.
    #[error("{0}")]
    InvalidCoordinate(String),

    /// The workbook contains no worksheets.
    #[error("Workbook contains no worksheets")]
    NoWorksheets,

    #[error("Worksheet '{0}' not found")]
    WorksheetNotFound(String),

    #[error("Worksheet '{0}' already exists")]
    WorksheetAlreadyExists(String),

    /// Blob storage request failed.
    #[error("S3 error: {0}")]
    S3Error(String),

    #[error("{0}")]
    Custom(String),
}

impl SheetfmtError {
    /// Build a free-form error.
    pub fn custom<S: Into<String>>(msg: S) -> Self {
        SheetfmtError::Custom(msg.into())
    }
}

impl From<quick_xml::Error> for SheetfmtError {
    fn from(e: quick_xml::Error) -> Self {
        SheetfmtError::ParseError(format!("XML parsing error: {}", e))
    }
}
