//! Backend collaborator contract and the request/response shapes it uses.
//!
//! [`ReviewApi`] is implemented over HTTP by `review-client`; tests supply
//! in-memory fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::types::{Asset, DecisionAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PreviewInclude {
    Both,
    Keep,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePreviewRequest {
    pub include: PreviewInclude,
    pub limit: usize,
}

impl MovePreviewRequest {
    pub fn both(limit: usize) -> Self {
        Self {
            include: PreviewInclude::Both,
            limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveMode {
    Execute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSelection {
    pub asset_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveExecuteRequest {
    pub mode: MoveMode,
    pub selection: MoveSelection,
}

impl MoveExecuteRequest {
    pub fn execute(asset_ids: Vec<String>) -> Self {
        Self {
            mode: MoveMode::Execute,
            selection: MoveSelection { asset_ids },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub action: DecisionAction,
}

#[async_trait]
pub trait ReviewApi: Send + Sync {
    async fn list_assets(&self) -> Result<Vec<Asset>, ApiError>;

    async fn submit_decision(&self, asset_id: &str, action: DecisionAction)
        -> Result<(), ApiError>;

    async fn preview_move_batch(&self, request: &MovePreviewRequest) -> Result<Value, ApiError>;

    async fn execute_move_batch(
        &self,
        request: &MoveExecuteRequest,
        idempotency_key: &str,
    ) -> Result<Value, ApiError>;

    async fn get_move_batch_report(&self, batch_id: &str) -> Result<Value, ApiError>;

    async fn preview_asset_purge(&self, asset_id: &str) -> Result<Value, ApiError>;

    async fn execute_asset_purge(
        &self,
        asset_id: &str,
        idempotency_key: &str,
    ) -> Result<Value, ApiError>;
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// The `batch_id` of an execute response, coerced to a string.
///
/// Strings are taken as-is, numbers and booleans by their display form;
/// a missing or null id yields `None`.
pub fn extract_batch_id(response: &Value) -> Option<String> {
    match response.get("batch_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[derive(Debug, Deserialize)]
struct AssetList {
    items: Vec<Asset>,
}

/// Validate a `GET /v1/assets` body. Accepts `{items: [...]}` or a bare array.
pub fn parse_asset_list(body: Value) -> Result<Vec<Asset>, ApiError> {
    let parsed = if body.is_array() {
        serde_json::from_value::<Vec<Asset>>(body)
    } else {
        serde_json::from_value::<AssetList>(body).map(|list| list.items)
    };
    parsed.map_err(|e| ApiError::Validation(format!("asset list: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetState;
    use serde_json::json;

    #[test]
    fn batch_id_is_coerced_to_string() {
        assert_eq!(extract_batch_id(&json!({"batch_id": "b-1"})), Some("b-1".into()));
        assert_eq!(extract_batch_id(&json!({"batch_id": 42})), Some("42".into()));
        assert_eq!(extract_batch_id(&json!({"batch_id": null})), None);
        assert_eq!(extract_batch_id(&json!({"status": "ok"})), None);
        assert_eq!(extract_batch_id(&json!("b-1")), None);
    }

    #[test]
    fn execute_request_wire_shape() {
        let body = serde_json::to_value(MoveExecuteRequest::execute(vec!["a".into()])).unwrap();
        assert_eq!(body, json!({"mode": "EXECUTE", "selection": {"asset_ids": ["a"]}}));
        let body = serde_json::to_value(MovePreviewRequest::both(3)).unwrap();
        assert_eq!(body, json!({"include": "BOTH", "limit": 3}));
    }

    #[test]
    fn asset_list_accepts_wrapped_and_bare() {
        let wrapped = json!({"items": [{"id": "a", "name": "A", "state": "DECIDED_KEEP"}]});
        let assets = parse_asset_list(wrapped).unwrap();
        assert_eq!(assets[0].state, AssetState::DecidedKeep);

        let bare = json!([{"id": "b", "name": "B", "state": "DECISION_PENDING"}]);
        assert_eq!(parse_asset_list(bare).unwrap().len(), 1);
    }

    #[test]
    fn asset_list_rejects_bad_shape() {
        let err = parse_asset_list(json!({"items": [{"id": 1}]})).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
