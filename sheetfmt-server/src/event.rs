//! Serverless-style event adapter.
//!
//! An event carries the request in `body`, either as JSON text (optionally
//! base64 wrapped, flagged by `isBase64Encoded`) or as an already decoded
//! object. The reply mirrors the HTTP contract inside an envelope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::process::{decode_base64, parse_json, process_payload, ProcessResponse, Staging};

/// Reply envelope: `{"statusCode", "headers", "body"}` with `body` JSON text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl EventResponse {
    fn json(status_code: u16, body: &Value) -> Self {
        let headers = BTreeMap::from([("Content-Type".to_string(), "application/json".to_string())]);
        EventResponse {
            status_code,
            headers,
            body: body.to_string(),
        }
    }
}

/// Pull the request payload out of an event.
fn event_payload(event: &Value) -> Result<Value, ApiError> {
    match event.get("body") {
        Some(Value::String(text)) => {
            let wrapped = event
                .get("isBase64Encoded")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            if wrapped {
                let raw = decode_base64(text).map_err(|_| ApiError::InvalidJson)?;
                parse_json(&raw)
            } else {
                parse_json(text.as_bytes())
            }
        }
        Some(body) => Ok(body.clone()),
        None => Ok(Value::Null),
    }
}

/// Handle one event. Never fails: every error becomes a status and error body.
pub fn handle_event(event: &Value, staging: &Staging) -> EventResponse {
    respond(event_payload(event).and_then(|payload| process_payload(&payload, staging)))
}

/// Handle an event still in its serialized form.
pub fn handle_raw_event(raw: &[u8], staging: &Staging) -> EventResponse {
    match parse_json(raw) {
        Ok(event) => handle_event(&event, staging),
        Err(e) => respond(Err(e)),
    }
}

fn respond(result: Result<ProcessResponse, ApiError>) -> EventResponse {
    match result {
        Ok(response) => {
            let body = serde_json::to_value(&response).unwrap_or(Value::Null);
            EventResponse::json(200, &body)
        }
        Err(e) => {
            e.log();
            EventResponse::json(e.status().as_u16(), &e.body())
        }
    }
}
