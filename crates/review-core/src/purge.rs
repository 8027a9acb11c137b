use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ReviewContext;
use crate::status;
use crate::types::Status;

#[derive(Debug, Clone, Default, Serialize)]
pub struct PurgeSnapshot {
    pub executing_purge: bool,
    pub preview_asset_id: Option<String>,
    pub preview: Option<Value>,
    pub status: Option<Status>,
}

/// Preview and execute permanent deletion of single assets.
pub struct PurgeController {
    ctx: ReviewContext,
    state: Mutex<PurgeSnapshot>,
}

impl PurgeController {
    pub fn new(ctx: ReviewContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(PurgeSnapshot::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, PurgeSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PurgeSnapshot {
        self.state().clone()
    }

    /// Ask the backend what purging `asset_id` would remove.
    pub async fn preview_purge(&self, asset_id: &str) -> Option<Value> {
        let result = self.ctx.api.preview_asset_purge(asset_id).await;
        let preview = {
            let mut s = self.state();
            match result {
                Ok(preview) => {
                    s.preview_asset_id = Some(asset_id.to_string());
                    s.preview = Some(preview.clone());
                    s.status = Some(status::purge_preview_ready(self.ctx.t(), asset_id));
                    Some(preview)
                }
                Err(e) => {
                    warn!(%asset_id, error = %e, "purge preview failed");
                    s.status = Some(status::purge_preview_error(
                        self.ctx.t(),
                        &e,
                        self.ctx.mapper(),
                    ));
                    None
                }
            }
        };
        self.ctx.feed.notify();
        preview
    }

    /// Purge `asset_id`. Returns `true` only when the backend confirmed it;
    /// a call while another purge is in flight is a no-op returning `false`.
    pub async fn execute_purge(&self, asset_id: &str) -> bool {
        {
            let mut s = self.state();
            if s.executing_purge {
                debug!(%asset_id, "purge skipped: another purge in flight");
                return false;
            }
            s.executing_purge = true;
            s.status = None;
        }
        self.ctx.feed.notify();
        let flight = PurgeFlight(self);

        let idempotency_key = Uuid::new_v4().to_string();
        info!(%asset_id, %idempotency_key, "purging asset");
        let result = self
            .ctx
            .api
            .execute_asset_purge(asset_id, &idempotency_key)
            .await;

        let purged = {
            let mut s = self.state();
            match result {
                Ok(_) => {
                    if s.preview_asset_id.as_deref() == Some(asset_id) {
                        s.preview_asset_id = None;
                        s.preview = None;
                    }
                    s.status = Some(status::purge_success(self.ctx.t(), asset_id));
                    true
                }
                Err(e) => {
                    warn!(%asset_id, error = %e, "purge failed");
                    s.status = Some(status::purge_error(self.ctx.t(), &e, self.ctx.mapper()));
                    false
                }
            }
        };
        drop(flight);
        self.ctx.feed.notify();
        purged
    }
}

/// Clears `executing_purge` even when the purge future is dropped mid-call.
struct PurgeFlight<'a>(&'a PurgeController);

impl Drop for PurgeFlight<'_> {
    fn drop(&mut self) {
        self.0.state().executing_purge = false;
    }
}
