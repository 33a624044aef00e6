//! Two-phase processing through blob storage.
//!
//! Phase one hands out a presigned upload URL under `uploads/<id>/<name>`.
//! Phase two formats the uploaded object, stores the result under
//! `processed/<id>/processed_<name>` and hands out a presigned download URL.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sheetfmt_core::BlobStore;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::process::{format_workbook_bytes, has_xlsx_extension, processed_name, Staging};

const UPLOAD_PREFIX: &str = "uploads/";
const PROCESSED_PREFIX: &str = "processed/";

/// What a blob request asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobAction {
    /// Issue an upload URL for a new file.
    Upload { filename: String },
    /// Format an object previously uploaded under `key`.
    Process { key: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    pub upload_url: String,
    pub key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedBlob {
    pub filename: String,
    pub download_url: String,
}

/// Decide the action. Exactly one of `filename` and `key` must be a string.
pub fn classify(payload: &Value) -> Result<BlobAction, ApiError> {
    let field = |name: &str| payload.get(name).and_then(Value::as_str);
    match (field("filename"), field("key")) {
        (Some(filename), None) => {
            if !has_xlsx_extension(filename) {
                return Err(ApiError::BadExtension);
            }
            Ok(BlobAction::Upload { filename: filename.to_string() })
        }
        (None, Some(key)) => {
            if !has_xlsx_extension(key) {
                return Err(ApiError::BadExtension);
            }
            Ok(BlobAction::Process { key: key.to_string() })
        }
        _ => Err(ApiError::InvalidBlobRequest),
    }
}

/// Last path segment of a client-supplied name.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

pub fn upload_key(filename: &str) -> String {
    format!("{}{}/{}", UPLOAD_PREFIX, Uuid::new_v4(), base_name(filename))
}

/// Map `uploads/<id>/<name>` to `processed/<id>/processed_<name>`.
///
/// Returns the processed key and the processed file name. Keys outside the
/// upload area are refused.
pub fn processed_key(key: &str) -> Result<(String, String), ApiError> {
    let rest = key.strip_prefix(UPLOAD_PREFIX).ok_or(ApiError::InvalidBlobRequest)?;
    let (id, name) = rest.split_once('/').ok_or(ApiError::InvalidBlobRequest)?;
    if id.is_empty() || name.is_empty() || name.contains('/') {
        return Err(ApiError::InvalidBlobRequest);
    }
    let filename = processed_name(name);
    Ok((format!("{}{}/{}", PROCESSED_PREFIX, id, filename), filename))
}

/// Serve one blob request.
pub async fn handle_blob(
    store: Option<&BlobStore>,
    staging: &Staging,
    payload: &Value,
) -> Result<Value, ApiError> {
    let store = store.ok_or(ApiError::BlobNotConfigured)?;

    match classify(payload)? {
        BlobAction::Upload { filename } => {
            let key = upload_key(&filename);
            let upload_url = store.presign_upload(&key).await?;
            info!(%key, "issued upload url");
            serde_json::to_value(UploadTicket { upload_url, key })
                .map_err(|e| ApiError::Internal(e.to_string()))
        }
        BlobAction::Process { key } => {
            let (target, filename) = processed_key(&key)?;
            let input = store.get_bytes(&key).await?;
            info!(%key, bytes = input.len(), "fetched uploaded workbook");

            let staging = staging.clone();
            let output =
                tokio::task::spawn_blocking(move || format_workbook_bytes(&input, &staging)).await??;

            store.put_bytes(&target, output).await?;
            let download_url = store.presign_download(&target).await?;
            info!(key = %target, "stored processed workbook");
            serde_json::to_value(ProcessedBlob { filename, download_url })
                .map_err(|e| ApiError::Internal(e.to_string()))
        }
    }
}
