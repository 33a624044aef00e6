//! The request pipeline shared by every transport.
//!
//! Validation order is fixed: JSON, then fields, then extension, then base64,
//! then staging. Each step only runs when the previous one passed, so a bad
//! extension never reaches the decoder and bad base64 never touches disk.

use std::io::Write;
use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheetfmt_core::{format_active_sheet, CompressionLevel, SheetfmtError, Workbook};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::ApiError;

pub const XLSX_EXTENSION: &str = ".xlsx";
pub const PROCESSED_PREFIX: &str = "processed_";

/// A payload that passed field and extension checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRequest {
    pub filename: String,
    /// Base64 text, not yet decoded.
    pub file: String,
}

/// Success body: `{"filename": "processed_<name>", "content": <base64>}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub filename: String,
    pub content: String,
}

/// Where staged workbooks are written. `None` uses the system temp directory.
#[derive(Clone, Debug, Default)]
pub struct Staging {
    dir: Option<PathBuf>,
}

impl Staging {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Staging { dir }
    }

    /// A fresh `.xlsx` temp file, removed when dropped.
    fn temp_file(&self) -> std::io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("sheetfmt-").suffix(XLSX_EXTENSION);
        match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
    }
}

/// Parse a raw request body as JSON.
pub fn parse_json(body: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)
}

/// Whether a Content-Type header denotes JSON (`application/json` or `+json`).
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

pub fn has_xlsx_extension(name: &str) -> bool {
    name.ends_with(XLSX_EXTENSION)
}

pub fn processed_name(filename: &str) -> String {
    format!("{}{}", PROCESSED_PREFIX, filename)
}

/// Check the payload has string `file` and `filename` fields and an xlsx name.
pub fn validate(payload: &Value) -> Result<ProcessRequest, ApiError> {
    let field = |name: &str| payload.get(name).and_then(Value::as_str);
    let (Some(filename), Some(file)) = (field("filename"), field("file")) else {
        return Err(ApiError::MissingFields);
    };
    if !has_xlsx_extension(filename) {
        return Err(ApiError::BadExtension);
    }
    Ok(ProcessRequest {
        filename: filename.to_string(),
        file: file.to_string(),
    })
}

/// Decode standard padded base64, ignoring ASCII whitespace such as line wraps.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, ApiError> {
    let compact: Vec<u8> = text
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact).map_err(|_| ApiError::InvalidBase64)
}

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Stage `input` on disk, format its active sheet and return the saved package.
pub fn format_workbook_bytes(input: &[u8], staging: &Staging) -> Result<Vec<u8>, SheetfmtError> {
    let mut staged_input = staging.temp_file()?;
    staged_input.write_all(input)?;
    staged_input.flush()?;
    debug!(path = %staged_input.path().display(), "staged input workbook");

    let mut workbook = Workbook::load(staged_input.path())?;
    let row_count = format_active_sheet(&mut workbook)?;
    info!(row_count, "formatted active sheet");

    workbook.set_compression(CompressionLevel::Default);
    let staged_output = staging.temp_file()?;
    workbook.save(staged_output.path())?;
    let output = std::fs::read(staged_output.path())?;
    debug!(bytes = output.len(), "saved processed workbook");
    Ok(output)
}

/// Run a validated request through decode, format and encode.
pub fn process_request(request: &ProcessRequest, staging: &Staging) -> Result<ProcessResponse, ApiError> {
    let input = decode_base64(&request.file)?;
    info!(filename = %request.filename, bytes = input.len(), "decoded file");
    let output = format_workbook_bytes(&input, staging)?;
    Ok(ProcessResponse {
        filename: processed_name(&request.filename),
        content: encode_base64(&output),
    })
}

/// Validate and process an already-parsed JSON payload.
pub fn process_payload(payload: &Value, staging: &Staging) -> Result<ProcessResponse, ApiError> {
    let request = validate(payload)?;
    process_request(&request, staging)
}
