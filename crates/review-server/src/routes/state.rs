use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/state: everything the dashboard renders, in one document.
pub async fn get_state(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let source = if app.is_api_asset_source { "api" } else { "local" };
    let board = app.board.read().await;
    Ok(Json(json!({
        "revision": app.ctx.feed.revision(),
        "asset_source": source,
        "assets": board.assets(),
        "pending_ids": board.pending_ids(),
        "batch": app.batch.snapshot(),
        "purge": app.purge.snapshot(),
    })))
}
