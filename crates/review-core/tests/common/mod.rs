//! In-memory `ReviewApi` used by the controller tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use review_core::api::{MoveExecuteRequest, MovePreviewRequest, ReviewApi};
use review_core::types::{Asset, DecisionAction};
use review_core::{ApiError, ReviewContext};
use serde_json::{json, Value};
use tokio::sync::Notify;

#[derive(Default)]
pub struct FakeApi {
    pub assets: Mutex<Vec<Asset>>,
    pub preview_calls: Mutex<Vec<MovePreviewRequest>>,
    pub execute_calls: Mutex<Vec<(Vec<String>, String)>>,
    pub report_calls: Mutex<Vec<String>>,
    pub decision_calls: Mutex<Vec<(String, DecisionAction)>>,
    pub purge_calls: Mutex<Vec<(String, String)>>,

    pub execute_response: Mutex<Option<Value>>,
    pub report_response: Mutex<Option<Value>>,

    pub preview_error: Mutex<Option<ApiError>>,
    pub execute_error: Mutex<Option<ApiError>>,
    pub report_error: Mutex<Option<ApiError>>,
    pub purge_error: Mutex<Option<ApiError>>,
    pub failing_decisions: Mutex<HashSet<String>>,

    /// When set, `execute_move_batch` waits for one permit before answering.
    pub execute_gate: Option<Arc<Notify>>,
    /// When set, the next `get_move_batch_report` waits for one permit.
    pub report_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let api = Self {
            execute_gate: Some(Arc::clone(&gate)),
            ..Self::default()
        };
        (api, gate)
    }

    pub fn executed_selections(&self) -> Vec<Vec<String>> {
        self.execute_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(ids, _)| ids.clone())
            .collect()
    }

    pub fn idempotency_keys(&self) -> Vec<String> {
        self.execute_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, key)| key.clone())
            .collect()
    }
}

pub fn server_error(message: &str) -> ApiError {
    ApiError::Http {
        status: 500,
        code: "INTERNAL".into(),
        message: message.into(),
        retryable: false,
        correlation_id: None,
    }
}

pub fn ids(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

pub fn context(api: &Arc<FakeApi>) -> ReviewContext {
    let api: Arc<dyn ReviewApi> = Arc::clone(api) as Arc<dyn ReviewApi>;
    ReviewContext::new(api)
}

#[async_trait]
impl ReviewApi for FakeApi {
    async fn list_assets(&self) -> Result<Vec<Asset>, ApiError> {
        Ok(self.assets.lock().unwrap().clone())
    }

    async fn submit_decision(
        &self,
        asset_id: &str,
        action: DecisionAction,
    ) -> Result<(), ApiError> {
        self.decision_calls
            .lock()
            .unwrap()
            .push((asset_id.to_string(), action));
        if self.failing_decisions.lock().unwrap().contains(asset_id) {
            return Err(ApiError::Http {
                status: 409,
                code: "CONFLICT".into(),
                message: format!("asset {asset_id} is locked"),
                retryable: false,
                correlation_id: None,
            });
        }
        Ok(())
    }

    async fn preview_move_batch(&self, request: &MovePreviewRequest) -> Result<Value, ApiError> {
        self.preview_calls.lock().unwrap().push(request.clone());
        if let Some(e) = self.preview_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(json!({"keep": request.limit, "reject": 0}))
    }

    async fn execute_move_batch(
        &self,
        request: &MoveExecuteRequest,
        idempotency_key: &str,
    ) -> Result<Value, ApiError> {
        self.execute_calls.lock().unwrap().push((
            request.selection.asset_ids.clone(),
            idempotency_key.to_string(),
        ));
        if let Some(gate) = &self.execute_gate {
            gate.notified().await;
        }
        if let Some(e) = self.execute_error.lock().unwrap().clone() {
            return Err(e);
        }
        let response = self.execute_response.lock().unwrap().clone();
        Ok(response.unwrap_or_else(|| json!({"batch_id": "b-1"})))
    }

    async fn get_move_batch_report(&self, batch_id: &str) -> Result<Value, ApiError> {
        self.report_calls.lock().unwrap().push(batch_id.to_string());
        let gate = self.report_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(e) = self.report_error.lock().unwrap().clone() {
            return Err(e);
        }
        let response = self.report_response.lock().unwrap().clone();
        Ok(response.unwrap_or_else(|| json!({"batch_id": batch_id, "moved": 2})))
    }

    async fn preview_asset_purge(&self, asset_id: &str) -> Result<Value, ApiError> {
        if let Some(e) = self.purge_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(json!({"asset_id": asset_id, "files": 3}))
    }

    async fn execute_asset_purge(
        &self,
        asset_id: &str,
        idempotency_key: &str,
    ) -> Result<Value, ApiError> {
        self.purge_calls
            .lock()
            .unwrap()
            .push((asset_id.to_string(), idempotency_key.to_string()));
        if let Some(e) = self.purge_error.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(json!({"purged": asset_id}))
    }
}
