use axum::extract::State;
use axum::Json;
use review_core::board::ReviewBoard;
use review_core::decision::decide_assets;
use review_core::types::DecisionAction;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/assets: the board as last loaded.
pub async fn list_assets(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let board = app.board.read().await;
    Ok(Json(json!({ "items": board.assets() })))
}

/// POST /api/assets/refresh: reload the board from the backend, or in local
/// mode from `.review/assets.yaml` (the demo set when absent).
pub async fn refresh_assets(State(app): State<AppState>) -> Result<Json<Value>, AppError> {
    let assets = if app.is_api_asset_source {
        app.ctx.api.list_assets().await?
    } else {
        ReviewBoard::load_local(&app.root)?.assets().to_vec()
    };
    info!(count = assets.len(), local = !app.is_api_asset_source, "asset board refreshed");
    app.board.write().await.replace_all(assets);
    app.ctx.feed.notify();
    list_assets(State(app)).await
}

#[derive(Deserialize)]
pub struct DecisionBody {
    pub action: String,
    pub asset_ids: Vec<String>,
}

/// POST /api/decisions: keep or reject many assets; successes move on the
/// board, failures stay pending.
pub async fn decide(
    State(app): State<AppState>,
    Json(body): Json<DecisionBody>,
) -> Result<Json<Value>, AppError> {
    let action: DecisionAction = body.action.parse()?;
    if body.asset_ids.is_empty() {
        return Err(AppError::bad_request("asset_ids must not be empty"));
    }

    let result = decide_assets(
        &*app.ctx.api,
        app.is_api_asset_source,
        &body.asset_ids,
        action,
        app.ctx.mapper(),
    )
    .await;

    let mut board = app.board.write().await;
    let changed = board.apply_decision(&result);
    if changed > 0 {
        if !app.is_api_asset_source {
            board.save_local(&app.root)?;
        }
        app.ctx.feed.notify();
    }
    Ok(Json(json!({
        "result": result,
        "changed": changed,
        "assets": board.assets(),
    })))
}
