use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/purge/{id}/preview
pub async fn preview(
    State(app): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    app.purge.preview_purge(&asset_id).await;
    Ok(Json(serde_json::to_value(app.purge.snapshot())?))
}

/// POST /api/purge/{id}: purge and drop the asset from the board.
pub async fn execute(
    State(app): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let purged = app.purge.execute_purge(&asset_id).await;
    if purged && app.board.write().await.remove(&asset_id) {
        app.ctx.feed.notify();
    }
    Ok(Json(json!({
        "purged": purged,
        "purge": app.purge.snapshot(),
    })))
}
