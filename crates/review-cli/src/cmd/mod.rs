pub mod assets;
pub mod auth;
pub mod batch;
pub mod config;
pub mod decide;
pub mod init;
pub mod purge;
pub mod serve;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use review_client::ApiClient;
use review_core::config::Config;
use review_core::i18n::{Translate, Translator};
use review_core::session::Session;
use review_core::{status, ApiError, ReviewApi, ReviewContext};

/// Load `.review/config.yaml`, applying `--api-url` when given.
pub fn load_config(root: &Path, api_url: Option<&str>) -> anyhow::Result<Config> {
    let mut config = Config::load(root).context("failed to load config")?;
    if let Some(url) = api_url {
        config.api.base_url = url.to_string();
    }
    Ok(config)
}

/// HTTP client for `config` carrying the saved session token.
///
/// Retries are reported on stderr; a 401 drops the saved session.
pub fn client(root: &Path, config: &Config) -> anyhow::Result<ApiClient> {
    let translator = Translator::new(config.locale.clone());
    let session_root = root.to_path_buf();
    let token = Session::load(root)?.map(|s| s.access_token);

    let client = ApiClient::from_config(config)?
        .with_token(token)
        .with_retry_notifier(Arc::new(move |attempt: u32, max: u32| {
            eprintln!("{}", status::retrying(&translator, attempt, max).message);
        }))
        .with_auth_error_hook(Arc::new(move |_: &ApiError| {
            if let Err(e) = Session::clear(&session_root) {
                tracing::warn!(error = %e, "failed to clear session");
            }
        }));
    Ok(client)
}

/// Controller context over [`client`], translated for `config.locale`.
pub fn context(root: &Path, config: &Config) -> anyhow::Result<ReviewContext> {
    let api: Arc<dyn ReviewApi> = Arc::new(client(root, config)?);
    let translator: Arc<dyn Translate> = Arc::new(Translator::new(config.locale.clone()));
    Ok(ReviewContext::new(api).with_translator(translator))
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start tokio runtime")
}
