//! Decides what an "execute batch" request should do.
//!
//! Policy, first match wins:
//!
//! 1. an execution is in flight → [`BatchExecutionPlan::Ignore`]
//! 2. an execution is pending its undo window → [`BatchExecutionPlan::RunNow`]
//!    with the pending selection (a second request fires early)
//! 3. nothing selected → [`BatchExecutionPlan::Ignore`]
//! 4. otherwise → [`BatchExecutionPlan::Queue`] behind the undo window

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_UNDO_WINDOW_MS: u64 = 6000;

/// Longest undo window honored; larger values are clamped to it.
pub const MAX_UNDO_WINDOW_MS: u64 = 60 * 60 * 1000;

/// A batch execution waiting out its undo window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBatchExecution {
    pub asset_ids: Vec<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BatchExecutionPlan {
    Ignore,
    RunNow {
        selection: Vec<String>,
    },
    Queue {
        selection: Vec<String>,
        expires_at: DateTime<Utc>,
        undo_seconds: u64,
    },
}

pub fn plan_batch_execution(
    executing_batch: bool,
    pending: Option<&PendingBatchExecution>,
    batch_ids: &[String],
    now: DateTime<Utc>,
    undo_window_ms: u64,
) -> BatchExecutionPlan {
    if executing_batch {
        return BatchExecutionPlan::Ignore;
    }
    if let Some(pending) = pending {
        return BatchExecutionPlan::RunNow {
            selection: pending.asset_ids.clone(),
        };
    }
    if batch_ids.is_empty() {
        return BatchExecutionPlan::Ignore;
    }
    let window_ms = undo_window_ms.min(MAX_UNDO_WINDOW_MS);
    let expires_at = i64::try_from(window_ms)
        .ok()
        .and_then(|ms| now.checked_add_signed(Duration::milliseconds(ms)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    BatchExecutionPlan::Queue {
        selection: batch_ids.to_vec(),
        expires_at,
        undo_seconds: (window_ms as f64 / 1000.0).round() as u64,
    }
}

/// Whole seconds left in the undo window, rounded up. `0` when nothing is pending.
pub fn pending_batch_undo_seconds(
    pending: Option<&PendingBatchExecution>,
    now: DateTime<Utc>,
) -> u64 {
    let Some(pending) = pending else {
        return 0;
    };
    let remaining_ms = (pending.expires_at - now).num_milliseconds().max(0) as u64;
    remaining_ms.div_ceil(1000)
}
