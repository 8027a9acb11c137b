//! Status builders: one constructor per (flow, outcome) pair.
//!
//! Error builders never surface `ApiError` internals directly. The raw error
//! goes through the caller's mapper, or [`map_error_to_message`] when none is
//! given.

use crate::error::ApiError;
use crate::i18n::Translate;
use crate::types::Status;

/// Converts a backend or transport failure into a user-safe string.
pub type ErrorMapper = dyn Fn(&ApiError) -> String + Send + Sync;

/// Default mapper.
pub fn map_error_to_message(error: &ApiError) -> String {
    match error {
        ApiError::Http {
            status,
            message,
            correlation_id,
            ..
        } => {
            let base = if message.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                message.clone()
            };
            match correlation_id {
                Some(id) => format!("{base} (ref {id})"),
                None => base,
            }
        }
        ApiError::Network(_) => "network unavailable, check your connection".to_string(),
        ApiError::Validation(_) => "unexpected response from server".to_string(),
    }
}

fn mapped(error: &ApiError, mapper: Option<&ErrorMapper>) -> String {
    match mapper {
        Some(map) => map(error),
        None => map_error_to_message(error),
    }
}

fn error_status(
    t: &dyn Translate,
    key: &str,
    error: &ApiError,
    mapper: Option<&ErrorMapper>,
) -> Status {
    Status::error(t.translate(key, &[("error", mapped(error, mapper))]))
}

// ---------------------------------------------------------------------------
// Batch preview
// ---------------------------------------------------------------------------

pub fn preview_success(t: &dyn Translate) -> Status {
    Status::success(t.translate("batch.preview.success", &[]))
}

pub fn preview_error(t: &dyn Translate, error: &ApiError, mapper: Option<&ErrorMapper>) -> Status {
    error_status(t, "batch.preview.error", error, mapper)
}

// ---------------------------------------------------------------------------
// Batch execute
// ---------------------------------------------------------------------------

pub fn execute_success(t: &dyn Translate) -> Status {
    Status::success(t.translate("batch.execute.success", &[]))
}

pub fn execute_queued(t: &dyn Translate, seconds: u64) -> Status {
    Status::success(t.translate("batch.execute.queued", &[("seconds", seconds.to_string())]))
}

pub fn execute_canceled(t: &dyn Translate) -> Status {
    Status::success(t.translate("batch.execute.canceled", &[]))
}

pub fn execute_error(t: &dyn Translate, error: &ApiError, mapper: Option<&ErrorMapper>) -> Status {
    error_status(t, "batch.execute.error", error, mapper)
}

// ---------------------------------------------------------------------------
// Purge
// ---------------------------------------------------------------------------

pub fn purge_preview_ready(t: &dyn Translate, asset_id: &str) -> Status {
    Status::success(t.translate("purge.preview.ready", &[("asset_id", asset_id.to_string())]))
}

pub fn purge_preview_error(
    t: &dyn Translate,
    error: &ApiError,
    mapper: Option<&ErrorMapper>,
) -> Status {
    error_status(t, "purge.preview.error", error, mapper)
}

pub fn purge_success(t: &dyn Translate, asset_id: &str) -> Status {
    Status::success(t.translate("purge.success", &[("asset_id", asset_id.to_string())]))
}

pub fn purge_error(t: &dyn Translate, error: &ApiError, mapper: Option<&ErrorMapper>) -> Status {
    error_status(t, "purge.error", error, mapper)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

pub fn report_ready(t: &dyn Translate, batch_id: &str) -> Status {
    Status::success(t.translate("report.ready", &[("batch_id", batch_id.to_string())]))
}

pub fn report_error(t: &dyn Translate, error: &ApiError, mapper: Option<&ErrorMapper>) -> Status {
    error_status(t, "report.error", error, mapper)
}

pub fn export_done(t: &dyn Translate, extension: &str) -> Status {
    Status::success(t.translate(
        "batch.export.done",
        &[("format", extension.to_ascii_uppercase())],
    ))
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

pub fn retrying(t: &dyn Translate, attempt: u32, max_attempts: u32) -> Status {
    Status::success(t.translate(
        "transport.retrying",
        &[
            ("attempt", attempt.to_string()),
            ("max", max_attempts.to_string()),
        ],
    ))
}
