use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use review_core::api::{
    parse_asset_list, DecisionRequest, MoveExecuteRequest, MovePreviewRequest, ReviewApi,
};
use review_core::config::Config;
use review_core::types::{Asset, DecisionAction};
use review_core::ApiError;
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::transport::{AuthErrorHook, RetryNotifier, RetryPolicy, Transport};

/// `ReviewApi` over the DAM backend's `/v1` REST surface.
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            transport: Transport::new(base_url, timeout, policy)?,
        })
    }

    pub fn from_config(cfg: &Config) -> Result<Self, ClientError> {
        Self::new(
            &cfg.api.base_url,
            Duration::from_secs(cfg.api.timeout_secs),
            RetryPolicy::from_config(&cfg.retry),
        )
    }

    pub fn with_retry_notifier(mut self, notifier: Arc<RetryNotifier>) -> Self {
        self.transport = self.transport.with_retry_notifier(notifier);
        self
    }

    pub fn with_auth_error_hook(mut self, hook: Arc<AuthErrorHook>) -> Self {
        self.transport = self.transport.with_auth_error_hook(hook);
        self
    }

    pub fn with_token(self, token: Option<String>) -> Self {
        self.transport.set_token(token);
        self
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn token(&self) -> Option<String> {
        self.transport.token()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.transport.set_token(token);
    }
}

pub(crate) fn to_body<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Validation(format!("request body: {e}")))
}

#[async_trait]
impl ReviewApi for ApiClient {
    async fn list_assets(&self) -> Result<Vec<Asset>, ApiError> {
        let body = self.transport.get(&["v1", "assets"]).await?;
        parse_asset_list(body)
    }

    async fn submit_decision(
        &self,
        asset_id: &str,
        action: DecisionAction,
    ) -> Result<(), ApiError> {
        let body = to_body(&DecisionRequest { action })?;
        self.transport
            .post(&["v1", "assets", asset_id, "decision"], Some(&body), None)
            .await?;
        Ok(())
    }

    async fn preview_move_batch(&self, request: &MovePreviewRequest) -> Result<Value, ApiError> {
        let body = to_body(request)?;
        self.transport
            .post(&["v1", "move-batches", "preview"], Some(&body), None)
            .await
    }

    async fn execute_move_batch(
        &self,
        request: &MoveExecuteRequest,
        idempotency_key: &str,
    ) -> Result<Value, ApiError> {
        let body = to_body(request)?;
        self.transport
            .post(&["v1", "move-batches"], Some(&body), Some(idempotency_key))
            .await
    }

    async fn get_move_batch_report(&self, batch_id: &str) -> Result<Value, ApiError> {
        self.transport
            .get(&["v1", "move-batches", batch_id, "report"])
            .await
    }

    async fn preview_asset_purge(&self, asset_id: &str) -> Result<Value, ApiError> {
        self.transport
            .post(&["v1", "assets", asset_id, "purge", "preview"], None, None)
            .await
    }

    async fn execute_asset_purge(
        &self,
        asset_id: &str,
        idempotency_key: &str,
    ) -> Result<Value, ApiError> {
        self.transport
            .post(&["v1", "assets", asset_id, "purge"], None, Some(idempotency_key))
            .await
    }
}
