//! Keep/reject decisions over many assets at once.

use std::future::Future;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::ReviewApi;
use crate::error::ApiError;
use crate::status::{map_error_to_message, ErrorMapper};
use crate::types::{AssetState, DecisionAction};

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecisionSubmission {
    pub success_ids: Vec<String>,
    pub first_error_message: Option<String>,
}

/// Submit `action` for every id in `target_ids`.
///
/// In local mode (`is_api_asset_source == false`) every id succeeds and
/// `submit_one` is never called. Otherwise all calls run concurrently and are
/// settled before aggregating; only the first failure's mapped message is
/// kept. `success_ids` follows submission order.
pub async fn submit_review_decisions<F, Fut>(
    is_api_asset_source: bool,
    target_ids: &[String],
    action: DecisionAction,
    submit_one: F,
    mapper: Option<&ErrorMapper>,
) -> ReviewDecisionSubmission
where
    F: Fn(String, DecisionAction) -> Fut,
    Fut: Future<Output = Result<(), ApiError>>,
{
    if !is_api_asset_source {
        return ReviewDecisionSubmission {
            success_ids: target_ids.to_vec(),
            first_error_message: None,
        };
    }

    let calls = target_ids.iter().map(|id| {
        let call = submit_one(id.clone(), action);
        async move { (id, call.await) }
    });

    let mut success_ids = Vec::with_capacity(target_ids.len());
    let mut first_error_message = None;
    for (id, outcome) in join_all(calls).await {
        match outcome {
            Ok(()) => success_ids.push(id.clone()),
            Err(e) => {
                warn!(asset_id = %id, error = %e, "decision submit failed");
                if first_error_message.is_none() {
                    first_error_message = Some(match mapper {
                        Some(map) => map(&e),
                        None => map_error_to_message(&e),
                    });
                }
            }
        }
    }

    ReviewDecisionSubmission {
        success_ids,
        first_error_message,
    }
}

// ---------------------------------------------------------------------------
// Finalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BulkDecisionFinalizationResult {
    /// No attempt produced anything to report.
    None,
    Error {
        error_message: String,
    },
    Partial {
        success_ids: Vec<String>,
        success_count: usize,
        failed_count: usize,
        error_message: String,
        next_state: AssetState,
    },
    Success {
        success_ids: Vec<String>,
        success_count: usize,
        next_state: AssetState,
    },
}

impl BulkDecisionFinalizationResult {
    /// Ids whose state should move to `next_state`, with that state.
    pub fn applied(&self) -> Option<(&[String], AssetState)> {
        match self {
            Self::Partial {
                success_ids,
                next_state,
                ..
            }
            | Self::Success {
                success_ids,
                next_state,
                ..
            } => Some((success_ids, *next_state)),
            Self::None | Self::Error { .. } => None,
        }
    }
}

pub fn finalize_bulk_decision(
    action: DecisionAction,
    target_ids: &[String],
    success_ids: &[String],
    first_error_message: Option<&str>,
) -> BulkDecisionFinalizationResult {
    if success_ids.is_empty() {
        return match first_error_message {
            None => BulkDecisionFinalizationResult::None,
            Some(msg) => BulkDecisionFinalizationResult::Error {
                error_message: msg.to_string(),
            },
        };
    }

    let failed_count = target_ids.len().saturating_sub(success_ids.len());
    let next_state = action.next_state();
    match first_error_message {
        Some(msg) if failed_count > 0 => BulkDecisionFinalizationResult::Partial {
            success_ids: success_ids.to_vec(),
            success_count: success_ids.len(),
            failed_count,
            error_message: msg.to_string(),
            next_state,
        },
        _ => BulkDecisionFinalizationResult::Success {
            success_ids: success_ids.to_vec(),
            success_count: success_ids.len(),
            next_state,
        },
    }
}

/// Submit and finalize one bulk decision against the backend.
pub async fn decide_assets(
    api: &dyn ReviewApi,
    is_api_asset_source: bool,
    target_ids: &[String],
    action: DecisionAction,
    mapper: Option<&ErrorMapper>,
) -> BulkDecisionFinalizationResult {
    debug!(count = target_ids.len(), %action, "submitting decisions");
    let submission = submit_review_decisions(
        is_api_asset_source,
        target_ids,
        action,
        |id, action| async move { api.submit_decision(&id, action).await },
        mapper,
    )
    .await;
    finalize_bulk_decision(
        action,
        target_ids,
        &submission.success_ids,
        submission.first_error_message.as_deref(),
    )
}
