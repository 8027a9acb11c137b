mod common;

use std::sync::Arc;

use common::{context, ids, server_error, FakeApi};
use review_core::board::ReviewBoard;
use review_core::decision::{decide_assets, BulkDecisionFinalizationResult};
use review_core::purge::PurgeController;
use review_core::types::{Asset, AssetState, DecisionAction, Status};

#[tokio::test]
async fn preview_then_purge_clears_preview() {
    let api = Arc::new(FakeApi::new());
    let purge = PurgeController::new(context(&api));

    let preview = purge.preview_purge("a-1").await;
    assert!(preview.is_some());
    let snap = purge.snapshot();
    assert_eq!(snap.preview_asset_id.as_deref(), Some("a-1"));
    assert_eq!(
        snap.status,
        Some(Status::success("Purge preview ready for a-1."))
    );

    assert!(purge.execute_purge("a-1").await);
    let snap = purge.snapshot();
    assert!(snap.preview.is_none());
    assert!(!snap.executing_purge);
    assert_eq!(snap.status, Some(Status::success("Asset a-1 purged.")));
    assert_eq!(api.purge_calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn purge_of_other_asset_keeps_preview() {
    let api = Arc::new(FakeApi::new());
    let purge = PurgeController::new(context(&api));
    purge.preview_purge("a-1").await;

    assert!(purge.execute_purge("a-2").await);
    assert_eq!(purge.snapshot().preview_asset_id.as_deref(), Some("a-1"));
}

#[tokio::test]
async fn purge_failure_is_reported() {
    let api = Arc::new(FakeApi::new());
    *api.purge_error.lock().unwrap() = Some(server_error("asset is referenced"));
    let purge = PurgeController::new(context(&api));

    assert!(purge.preview_purge("a-1").await.is_none());
    assert_eq!(
        purge.snapshot().status,
        Some(Status::error("Purge preview failed: asset is referenced"))
    );

    assert!(!purge.execute_purge("a-1").await);
    let snap = purge.snapshot();
    assert!(!snap.executing_purge);
    assert_eq!(
        snap.status,
        Some(Status::error("Purge failed: asset is referenced"))
    );
}

#[tokio::test]
async fn purge_keys_are_unique() {
    let api = Arc::new(FakeApi::new());
    let purge = PurgeController::new(context(&api));
    purge.execute_purge("a-1").await;
    purge.execute_purge("a-1").await;

    let calls = api.purge_calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].1, calls[1].1);
}

// ---------------------------------------------------------------------------
// Bulk decisions against the board
// ---------------------------------------------------------------------------

fn board() -> ReviewBoard {
    ReviewBoard::new(vec![
        Asset::new("a", "Alpha"),
        Asset::new("b", "Beta"),
        Asset::new("c", "Gamma"),
    ])
}

#[tokio::test]
async fn partial_bulk_reject_updates_only_successes() {
    let api = Arc::new(FakeApi::new());
    api.failing_decisions.lock().unwrap().insert("b".into());
    let mut board = board();

    let targets = ids(&["a", "b", "c"]);
    let result = decide_assets(&*api, true, &targets, DecisionAction::Reject, None).await;

    match &result {
        BulkDecisionFinalizationResult::Partial {
            success_ids,
            success_count,
            failed_count,
            error_message,
            next_state,
        } => {
            assert_eq!(success_ids, &ids(&["a", "c"]));
            assert_eq!(*success_count, 2);
            assert_eq!(*failed_count, 1);
            assert_eq!(error_message, "asset b is locked");
            assert_eq!(*next_state, AssetState::DecidedReject);
        }
        other => panic!("expected partial, got {other:?}"),
    }

    assert_eq!(board.apply_decision(&result), 2);
    assert_eq!(board.get("a").unwrap().state, AssetState::DecidedReject);
    assert_eq!(board.get("b").unwrap().state, AssetState::DecisionPending);
    assert_eq!(board.pending_ids(), ids(&["b"]));
}

#[tokio::test]
async fn local_mode_never_calls_backend() {
    let api = Arc::new(FakeApi::new());
    let targets = ids(&["a", "b"]);
    let result = decide_assets(&*api, false, &targets, DecisionAction::Keep, None).await;

    assert!(matches!(
        result,
        BulkDecisionFinalizationResult::Success {
            success_count: 2,
            ..
        }
    ));
    assert!(api.decision_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn all_failed_is_an_error_result() {
    let api = Arc::new(FakeApi::new());
    api.failing_decisions
        .lock()
        .unwrap()
        .extend(["a".to_string(), "b".to_string()]);
    let mut board = board();

    let targets = ids(&["a", "b"]);
    let result = decide_assets(&*api, true, &targets, DecisionAction::Keep, None).await;

    assert_eq!(
        result,
        BulkDecisionFinalizationResult::Error {
            error_message: "asset a is locked".into()
        }
    );
    assert_eq!(board.apply_decision(&result), 0);
}
