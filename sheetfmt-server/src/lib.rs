//! Transport front ends for the sheetfmt formatter.
//!
//! Every front end funnels into [`process::process_payload`] (or its blob
//! counterpart) and maps failures through [`error::ApiError`].

pub mod blob;
pub mod config;
pub mod error;
pub mod event;
pub mod http;
pub mod process;

pub use error::ApiError;
pub use event::{handle_event, handle_raw_event, EventResponse};
pub use http::{router, AppState};
pub use process::{ProcessResponse, Staging};
