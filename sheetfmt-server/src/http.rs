//! HTTP routes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use sheetfmt_core::BlobStore;
use tokio::net::TcpListener;
use tracing::info;

use crate::blob::handle_blob;
use crate::error::ApiError;
use crate::event::{handle_raw_event, EventResponse};
use crate::process::{is_json_content_type, parse_json, process_request, validate, ProcessResponse, Staging};

/// Shared, read-only request context.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub staging: Staging,
    pub blob: Option<BlobStore>,
}

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/process_excel", post(process_excel))
        .route("/api/event", post(process_event))
        .route("/api/blob", post(process_blob))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(Arc::new(state))
}

/// Serve until ctrl-c.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
}

/// Reject non-JSON content types, then parse the body.
fn json_body(headers: &HeaderMap, body: &[u8]) -> Result<Value, ApiError> {
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if !is_json_content_type(content_type) {
        return Err(ApiError::NotJson {
            content_type: content_type.map(str::to_string),
        });
    }
    parse_json(body)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn process_excel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let body = body?;
    info!(bytes = body.len(), "received request");
    let payload = json_body(&headers, &body)?;
    let request = validate(&payload)?;

    let staging = state.staging.clone();
    let response = tokio::task::spawn_blocking(move || process_request(&request, &staging)).await??;
    Ok(Json(response))
}

/// Answers 200 for any readable body; the outcome travels in the envelope's `statusCode`.
async fn process_event(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<EventResponse>, ApiError> {
    let body = body?;
    let staging = state.staging.clone();
    let response = tokio::task::spawn_blocking(move || handle_raw_event(&body, &staging)).await?;
    Ok(Json(response))
}

async fn process_blob(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = body?;
    let payload = json_body(&headers, &body)?;
    let response = handle_blob(state.blob.as_ref(), &state.staging, &payload).await?;
    Ok(Json(response))
}
