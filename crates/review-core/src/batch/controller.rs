use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::timeline::{batch_timeline, BatchTimeline};
use crate::api::{extract_batch_id, MoveExecuteRequest, MovePreviewRequest};
use crate::context::ReviewContext;
use crate::planner::{
    pending_batch_undo_seconds, plan_batch_execution, BatchExecutionPlan, PendingBatchExecution,
    DEFAULT_UNDO_WINDOW_MS, MAX_UNDO_WINDOW_MS,
};
use crate::report::{
    load_batch_report, serialize_report, DownloadTarget, ExportFormat, ReportDownload,
    ReportLoadResult,
};
use crate::status;
use crate::types::Status;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct UndoTimer {
    seq: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct BatchState {
    batch_ids: Vec<String>,
    pending: Option<PendingBatchExecution>,
    timer: Option<UndoTimer>,
    timer_seq: u64,
    executing_batch: bool,
    previewing_batch: bool,
    report_loading: bool,
    /// A newer report id arrived while a load was in flight.
    report_reload: bool,
    preview: Option<Value>,
    preview_status: Option<Status>,
    execute_status: Option<Status>,
    report_status: Option<Status>,
    retry_status: Option<Status>,
    report_id: Option<String>,
    report: Option<Value>,
}

impl BatchState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }

    /// Take the execute guard. No-op for an empty selection or while another
    /// execution is in flight.
    fn claim_execution(&mut self, asset_ids: &[String]) -> bool {
        if asset_ids.is_empty() || self.executing_batch {
            debug!("batch execution skipped");
            return false;
        }
        self.executing_batch = true;
        self.execute_status = None;
        true
    }

    fn claim_report(&mut self) -> bool {
        if self.report_loading {
            return false;
        }
        self.report_loading = true;
        true
    }

    fn is_busy(&self) -> bool {
        self.pending.is_some() || self.executing_batch || self.report_loading
    }
}

/// Point-in-time view of the controller, as rendered by the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSnapshot {
    pub batch_ids: Vec<String>,
    pub pending: Option<PendingBatchExecution>,
    pub undo_seconds_remaining: u64,
    pub executing_batch: bool,
    pub previewing_batch: bool,
    pub report_loading: bool,
    pub preview: Option<Value>,
    pub preview_status: Option<Status>,
    pub execute_status: Option<Status>,
    pub report_status: Option<Status>,
    pub retry_status: Option<Status>,
    pub report_id: Option<String>,
    pub report: Option<Value>,
    pub timeline: BatchTimeline,
}

// ---------------------------------------------------------------------------
// In-flight guards
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Flight {
    Preview,
    Execute,
    Report,
}

/// Clears a flight flag when the operation finishes, fails, or is dropped.
struct FlightGuard<'a> {
    controller: &'a BatchController,
    flight: Flight,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        {
            let mut s = self.controller.state();
            match self.flight {
                Flight::Preview => {
                    s.previewing_batch = false;
                    s.retry_status = None;
                }
                Flight::Execute => {
                    s.executing_batch = false;
                    s.retry_status = None;
                }
                Flight::Report => {
                    s.report_loading = false;
                    s.report_reload = false;
                }
            }
        }
        self.controller.notify();
    }
}

// ---------------------------------------------------------------------------
// BatchController
// ---------------------------------------------------------------------------

struct Inner {
    ctx: ReviewContext,
    undo_window_ms: u64,
    state: Mutex<BatchState>,
}

/// Owns the batch-move lifecycle: preview, queue behind the undo window,
/// execute, and load/export the resulting report.
///
/// Cheap to clone; clones share state. At most one undo timer is outstanding:
/// every path that schedules or bypasses the timer cancels the previous one
/// first, and a firing timer detaches itself under the same lock that
/// cancellation takes.
#[derive(Clone)]
pub struct BatchController {
    inner: Arc<Inner>,
}

impl BatchController {
    pub fn new(ctx: ReviewContext) -> Self {
        Self::with_undo_window(ctx, DEFAULT_UNDO_WINDOW_MS)
    }

    /// Windows above [`MAX_UNDO_WINDOW_MS`] are clamped.
    pub fn with_undo_window(ctx: ReviewContext, undo_window_ms: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                ctx,
                undo_window_ms: undo_window_ms.min(MAX_UNDO_WINDOW_MS),
                state: Mutex::new(BatchState::default()),
            }),
        }
    }

    pub fn context(&self) -> &ReviewContext {
        &self.inner.ctx
    }

    fn state(&self) -> MutexGuard<'_, BatchState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.inner.ctx.feed.notify();
    }

    // -----------------------------------------------------------------------
    // Selection and status
    // -----------------------------------------------------------------------

    pub fn set_batch_ids(&self, ids: Vec<String>) {
        self.state().batch_ids = ids;
        self.notify();
    }

    pub fn batch_ids(&self) -> Vec<String> {
        self.state().batch_ids.clone()
    }

    /// Written by the transport's retry notifier; cleared when a preview or
    /// execution finishes.
    pub fn set_retry_status(&self, status: Option<Status>) {
        self.state().retry_status = status;
        self.notify();
    }

    pub fn has_pending(&self) -> bool {
        self.state().pending.is_some()
    }

    pub fn is_executing(&self) -> bool {
        self.state().executing_batch
    }

    /// `true` while an execution is queued, running, or loading its report.
    pub fn is_busy(&self) -> bool {
        self.state().is_busy()
    }

    /// Resolve once nothing is queued, running, or loading.
    pub async fn wait_until_settled(&self) {
        let mut changes = self.inner.ctx.feed.subscribe();
        while self.is_busy() {
            if changes.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn snapshot(&self) -> BatchSnapshot {
        let s = self.state();
        let timeline = batch_timeline(
            s.pending.is_some(),
            s.executing_batch,
            s.execute_status.as_ref().map(|st| st.kind),
            self.inner.ctx.t(),
        );
        BatchSnapshot {
            batch_ids: s.batch_ids.clone(),
            pending: s.pending.clone(),
            undo_seconds_remaining: pending_batch_undo_seconds(s.pending.as_ref(), Utc::now()),
            executing_batch: s.executing_batch,
            previewing_batch: s.previewing_batch,
            report_loading: s.report_loading,
            preview: s.preview.clone(),
            preview_status: s.preview_status.clone(),
            execute_status: s.execute_status.clone(),
            report_status: s.report_status.clone(),
            retry_status: s.retry_status.clone(),
            report_id: s.report_id.clone(),
            report: s.report.clone(),
            timeline,
        }
    }

    // -----------------------------------------------------------------------
    // Preview
    // -----------------------------------------------------------------------

    pub async fn preview_batch_move(&self) {
        let limit = {
            let mut s = self.state();
            if s.batch_ids.is_empty() || s.previewing_batch {
                debug!("batch preview skipped");
                return;
            }
            s.previewing_batch = true;
            s.batch_ids.len()
        };
        self.notify();
        let _flight = FlightGuard {
            controller: self,
            flight: Flight::Preview,
        };

        let ctx = &self.inner.ctx;
        let result = ctx
            .api
            .preview_move_batch(&MovePreviewRequest::both(limit))
            .await;

        let mut s = self.state();
        match result {
            Ok(preview) => {
                s.preview = Some(preview);
                s.preview_status = Some(status::preview_success(ctx.t()));
            }
            Err(e) => {
                warn!(error = %e, "batch preview failed");
                s.preview_status = Some(status::preview_error(ctx.t(), &e, ctx.mapper()));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Execute
    // -----------------------------------------------------------------------

    /// Queue the current selection behind the undo window, or, when an
    /// execution is already queued, run that one immediately.
    pub async fn execute_batch_move(&self) {
        let run_now = {
            let mut s = self.state();
            let plan = plan_batch_execution(
                s.executing_batch,
                s.pending.as_ref(),
                &s.batch_ids,
                Utc::now(),
                self.inner.undo_window_ms,
            );
            match plan {
                BatchExecutionPlan::Ignore => {
                    debug!("batch execute ignored");
                    return;
                }
                BatchExecutionPlan::RunNow { selection } => {
                    s.cancel_timer();
                    s.pending = None;
                    s.claim_execution(&selection).then_some(selection)
                }
                BatchExecutionPlan::Queue {
                    selection,
                    expires_at,
                    undo_seconds,
                } => {
                    info!(count = selection.len(), undo_seconds, "batch execution queued");
                    s.execute_status =
                        Some(status::execute_queued(self.inner.ctx.t(), undo_seconds));
                    s.pending = Some(PendingBatchExecution {
                        asset_ids: selection.clone(),
                        expires_at,
                    });
                    self.schedule(&mut s, selection);
                    None
                }
            }
        };
        self.notify();

        if let Some(selection) = run_now {
            self.run_batch_execution(selection).await;
        }
    }

    /// Drop a queued execution. Returns `false` when nothing was pending.
    pub fn cancel_pending_batch_execution(&self) -> bool {
        {
            let mut s = self.state();
            if s.pending.is_none() {
                return false;
            }
            s.cancel_timer();
            s.pending = None;
            s.execute_status = Some(status::execute_canceled(self.inner.ctx.t()));
        }
        info!("batch execution canceled");
        self.notify();
        true
    }

    fn schedule(&self, s: &mut BatchState, selection: Vec<String>) {
        s.cancel_timer();
        s.timer_seq += 1;
        let seq = s.timer_seq;
        let controller = self.clone();
        let delay = Duration::from_millis(self.inner.undo_window_ms);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            controller.fire_timer(seq, selection).await;
        });
        s.timer = Some(UndoTimer { seq, handle });
    }

    async fn fire_timer(&self, seq: u64, selection: Vec<String>) {
        let claimed = {
            let mut s = self.state();
            // Canceled or superseded while waiting for the lock.
            if s.timer.as_ref().map(|t| t.seq) != Some(seq) {
                return;
            }
            s.timer = None;
            s.pending = None;
            s.claim_execution(&selection)
        };
        debug!("undo window elapsed");
        self.notify();
        if claimed {
            self.run_batch_execution(selection).await;
        }
    }

    /// Runs with `executing_batch` already claimed by the caller.
    async fn run_batch_execution(&self, asset_ids: Vec<String>) {
        let flight = FlightGuard {
            controller: self,
            flight: Flight::Execute,
        };

        let ctx = &self.inner.ctx;
        let idempotency_key = Uuid::new_v4().to_string();
        info!(count = asset_ids.len(), %idempotency_key, "executing batch move");
        let request = MoveExecuteRequest::execute(asset_ids);
        let result = ctx.api.execute_move_batch(&request, &idempotency_key).await;

        let report_id = {
            let mut s = self.state();
            match result {
                Ok(response) => {
                    let batch_id = extract_batch_id(&response);
                    s.execute_status = Some(status::execute_success(ctx.t()));
                    s.report_id = batch_id.clone();
                    s.report = None;
                    // Handed over before the execute flag drops, so the
                    // controller never looks idle between the two. A load
                    // already in flight picks the new id up when it ends.
                    match batch_id {
                        Some(id) if s.claim_report() => Some(id),
                        Some(_) => {
                            s.report_reload = true;
                            None
                        }
                        None => None,
                    }
                }
                Err(e) => {
                    warn!(error = %e, "batch execution failed");
                    s.execute_status = Some(status::execute_error(ctx.t(), &e, ctx.mapper()));
                    None
                }
            }
        };
        drop(flight);

        if let Some(batch_id) = report_id {
            self.fetch_report(batch_id).await;
        }
    }

    // -----------------------------------------------------------------------
    // Report
    // -----------------------------------------------------------------------

    /// Reload the report of the last execution.
    pub async fn refresh_batch_report(&self) {
        let batch_id = {
            let mut s = self.state();
            match s.report_id.clone() {
                Some(id) if s.claim_report() => id,
                _ => {
                    debug!("report refresh skipped");
                    return;
                }
            }
        };
        self.notify();
        self.fetch_report(batch_id).await;
    }

    /// Runs with `report_loading` already claimed by the caller. A result
    /// for a batch other than the current `report_id` is dropped, and a
    /// reload requested mid-flight runs before the flag is released.
    async fn fetch_report(&self, mut batch_id: String) {
        let _flight = FlightGuard {
            controller: self,
            flight: Flight::Report,
        };

        let ctx = &self.inner.ctx;
        loop {
            let api = Arc::clone(&ctx.api);
            let result = load_batch_report(
                move |id| async move { api.get_move_batch_report(&id).await },
                &batch_id,
                ctx.t(),
                ctx.mapper(),
            )
            .await;

            let next = {
                let mut s = self.state();
                if s.report_id.as_deref() == Some(batch_id.as_str()) {
                    match result {
                        ReportLoadResult::Success {
                            report,
                            status_message,
                        } => {
                            s.report = Some(report);
                            s.report_status = Some(Status::success(status_message));
                        }
                        ReportLoadResult::Error { status_message } => {
                            s.report_status = Some(Status::error(status_message));
                        }
                    }
                } else {
                    debug!(%batch_id, "stale report discarded");
                }
                if std::mem::take(&mut s.report_reload) {
                    s.report_id.clone()
                } else {
                    None
                }
            };

            match next {
                Some(id) => {
                    self.notify();
                    batch_id = id;
                }
                None => break,
            }
        }
    }

    /// Serialize the loaded report and hand it to `target` as
    /// `batch-<id>.<ext>`. Returns `false` (and changes nothing) when there
    /// is no report, no report id, or no target.
    pub fn export_batch_report(
        &self,
        format: ExportFormat,
        target: Option<&mut dyn DownloadTarget>,
    ) -> bool {
        let download = {
            let mut s = self.state();
            let (Some(report), Some(batch_id)) = (s.report.as_ref(), s.report_id.as_ref()) else {
                return false;
            };
            if target.is_none() {
                return false;
            }
            let download = ReportDownload::new(batch_id, serialize_report(format, report));
            s.report_status = Some(status::export_done(self.inner.ctx.t(), format.extension()));
            download
        };
        debug!(filename = %download.filename, "report exported");
        if let Some(target) = target {
            target.deliver(download);
        }
        self.notify();
        true
    }
}
