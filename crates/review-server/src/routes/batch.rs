use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use review_core::report::{ExportFormat, ReportDownload};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

fn snapshot(app: &AppState) -> Result<Json<Value>, AppError> {
    Ok(Json(serde_json::to_value(app.batch.snapshot())?))
}

#[derive(Deserialize)]
pub struct SelectionBody {
    pub asset_ids: Vec<String>,
}

/// PUT /api/batch/selection: replace the ids the next batch operates on.
pub async fn put_selection(
    State(app): State<AppState>,
    Json(body): Json<SelectionBody>,
) -> Result<Json<Value>, AppError> {
    app.batch.set_batch_ids(body.asset_ids);
    snapshot(&app)
}

/// POST /api/batch/preview
pub async fn preview(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    app.batch.preview_batch_move().await;
    snapshot(&app)
}

/// POST /api/batch/execute: queue behind the undo window, or run a queued
/// batch immediately.
pub async fn execute(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    app.batch.execute_batch_move().await;
    snapshot(&app)
}

/// POST /api/batch/cancel
pub async fn cancel(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let canceled = app.batch.cancel_pending_batch_execution();
    Ok(Json(json!({
        "canceled": canceled,
        "batch": app.batch.snapshot(),
    })))
}

/// POST /api/batch/report/refresh
pub async fn refresh_report(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    app.batch.refresh_batch_report().await;
    snapshot(&app)
}

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

/// GET /api/batch/report/export?format=json|csv: the loaded report as an
/// attachment named `batch-<id>.<ext>`.
pub async fn export_report(
    State(app): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format: ExportFormat = query.format.as_deref().unwrap_or("json").parse()?;

    let mut slot: Option<ReportDownload> = None;
    if !app.batch.export_batch_report(format, Some(&mut slot)) {
        return Err(AppError::not_found("no batch report loaded"));
    }
    let Some(download) = slot else {
        return Err(AppError::not_found("no batch report loaded"));
    };

    let headers = [
        (header::CONTENT_TYPE, download.mime_type.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", download.filename),
        ),
    ];
    Ok((headers, download.content).into_response())
}
