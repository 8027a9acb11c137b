use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use review_client::ApiClient;
use review_core::batch::BatchController;
use review_core::board::ReviewBoard;
use review_core::config::Config;
use review_core::i18n::{Translate, Translator};
use review_core::purge::PurgeController;
use review_core::session::Session;
use review_core::{status, ReviewApi, ReviewContext};
use tokio::sync::RwLock;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub ctx: ReviewContext,
    pub batch: BatchController,
    pub purge: Arc<PurgeController>,
    pub board: Arc<RwLock<ReviewBoard>>,
    pub is_api_asset_source: bool,
}

impl AppState {
    pub fn new(root: PathBuf, ctx: ReviewContext, cfg: &Config) -> Self {
        Self {
            root,
            batch: BatchController::with_undo_window(ctx.clone(), cfg.batch.undo_window_ms),
            purge: Arc::new(PurgeController::new(ctx.clone())),
            board: Arc::new(RwLock::new(ReviewBoard::default())),
            is_api_asset_source: cfg.is_api_asset_source(),
            ctx,
        }
    }

    /// Wire an HTTP client from `cfg`: retries surface as the batch retry
    /// status, and a 401 drops the saved session.
    pub fn from_config(root: PathBuf, cfg: &Config) -> anyhow::Result<Self> {
        let translator: Arc<dyn Translate> = Arc::new(Translator::new(cfg.locale.clone()));

        // The controller needs the client and the client's retry notifier
        // needs the controller; the cell is filled right after construction.
        let batch_cell: Arc<OnceLock<BatchController>> = Arc::new(OnceLock::new());
        let notify_cell = Arc::clone(&batch_cell);
        let notify_t = Arc::clone(&translator);
        let session_root = root.clone();

        let token = Session::load(&root)?.map(|s| s.access_token);
        let client = ApiClient::from_config(cfg)?
            .with_token(token)
            .with_retry_notifier(Arc::new(move |attempt: u32, max: u32| {
                if let Some(batch) = notify_cell.get() {
                    batch.set_retry_status(Some(status::retrying(&*notify_t, attempt, max)));
                }
            }))
            .with_auth_error_hook(Arc::new(move |_: &review_core::ApiError| {
                if let Err(e) = Session::clear(&session_root) {
                    tracing::warn!(error = %e, "failed to clear session");
                }
            }));

        let api: Arc<dyn ReviewApi> = Arc::new(client);
        let ctx = ReviewContext::new(api).with_translator(translator);
        let state = Self::new(root, ctx, cfg);
        // Freshly created cell; the set cannot fail.
        let _ = batch_cell.set(state.batch.clone());
        Ok(state)
    }
}
