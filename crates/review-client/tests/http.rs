use std::sync::{Arc, Mutex};
use std::time::Duration;

use mockito::Matcher;
use review_client::{ApiClient, AuthApi, LoginOutcome, RetryPolicy};
use review_core::api::{MoveExecuteRequest, MovePreviewRequest, ReviewApi};
use review_core::types::{AssetState, DecisionAction};
use review_core::ApiError;
use serde_json::json;

fn client(url: &str) -> ApiClient {
    ApiClient::new(
        url,
        Duration::from_secs(5),
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        },
    )
    .unwrap()
}

// ---------------------------------------------------------------------------
// Request shapes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_assets_sends_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("GET", "/v1/assets")
        .match_header("authorization", "Bearer tok-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"items":[{"id":"a","name":"Alpha","state":"DECISION_PENDING"}]}"#)
        .create_async()
        .await;

    let api = client(&server.url()).with_token(Some("tok-1".into()));
    let assets = api.list_assets().await.unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].state, AssetState::DecisionPending);
    m.assert_async().await;
}

#[tokio::test]
async fn execute_sends_idempotency_key_and_body() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("POST", "/v1/move-batches")
        .match_header("idempotency-key", "key-1")
        .match_body(Matcher::Json(
            json!({"mode": "EXECUTE", "selection": {"asset_ids": ["a", "b"]}}),
        ))
        .with_status(202)
        .with_body(r#"{"batch_id":"b-9"}"#)
        .create_async()
        .await;

    let api = client(&server.url());
    let request = MoveExecuteRequest::execute(vec!["a".into(), "b".into()]);
    let resp = api.execute_move_batch(&request, "key-1").await.unwrap();
    assert_eq!(resp, json!({"batch_id": "b-9"}));
    m.assert_async().await;
}

#[tokio::test]
async fn preview_and_decision_paths() {
    let mut server = mockito::Server::new_async().await;
    let preview = server
        .mock("POST", "/v1/move-batches/preview")
        .match_body(Matcher::Json(json!({"include": "BOTH", "limit": 2})))
        .with_status(200)
        .with_body(r#"{"keep":1,"reject":1}"#)
        .create_async()
        .await;
    let decision = server
        .mock("POST", "/v1/assets/a-1/decision")
        .match_body(Matcher::Json(json!({"action": "REJECT"})))
        .with_status(204)
        .create_async()
        .await;

    let api = client(&server.url());
    api.preview_move_batch(&MovePreviewRequest::both(2))
        .await
        .unwrap();
    api.submit_decision("a-1", DecisionAction::Reject)
        .await
        .unwrap();
    preview.assert_async().await;
    decision.assert_async().await;
}

#[tokio::test]
async fn empty_success_body_is_null() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/v1/assets/a-1/purge")
        .with_status(204)
        .create_async()
        .await;

    let resp = client(&server.url())
        .execute_asset_purge("a-1", "k")
        .await
        .unwrap();
    assert!(resp.is_null());
}

#[tokio::test]
async fn malformed_success_body_is_validation_error() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/v1/move-batches/b-1/report")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let err = client(&server.url())
        .get_move_batch_report("b-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Retry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("GET", "/v1/move-batches/b-1/report")
        .with_status(503)
        .with_body(r#"{"error":{"code":"UNAVAILABLE","message":"try later"}}"#)
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/v1/move-batches/b-1/report")
        .with_status(200)
        .with_body(r#"{"moved":3}"#)
        .expect(1)
        .create_async()
        .await;

    let retries = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&retries);
    let api = client(&server.url()).with_retry_notifier(Arc::new(move |attempt: u32, max: u32| {
        seen.lock().unwrap().push((attempt, max));
    }));

    let report = api.get_move_batch_report("b-1").await.unwrap();
    assert_eq!(report, json!({"moved": 3}));
    assert_eq!(*retries.lock().unwrap(), vec![(2, 3)]);
    failing.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("POST", "/v1/move-batches/preview")
        .with_status(500)
        .with_header("x-correlation-id", "corr-7")
        .with_body(r#"{"code":"INTERNAL","message":"boom"}"#)
        .expect(3)
        .create_async()
        .await;

    let err = client(&server.url())
        .preview_move_batch(&MovePreviewRequest::both(1))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ApiError::Http { correlation_id: Some(ref c), .. } if c == "corr-7"));
    m.assert_async().await;
}

#[tokio::test]
async fn rate_limit_with_known_code_is_retried() {
    let mut server = mockito::Server::new_async().await;
    let limited = server
        .mock("GET", "/v1/assets")
        .with_status(429)
        .with_header("retry-after", "0")
        .with_body(r#"{"error":{"code":"RATE_LIMITED","message":"slow down"}}"#)
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("GET", "/v1/assets")
        .with_status(200)
        .with_body(r#"{"items":[]}"#)
        .expect(1)
        .create_async()
        .await;

    assert!(client(&server.url()).list_assets().await.unwrap().is_empty());
    limited.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("POST", "/v1/assets/a-1/decision")
        .with_status(409)
        .with_body(r#"{"error":{"code":"CONFLICT","message":"asset is locked"}}"#)
        .expect(1)
        .create_async()
        .await;

    let err = client(&server.url())
        .submit_decision("a-1", DecisionAction::Keep)
        .await
        .unwrap_err();
    assert_eq!(
        review_core::status::map_error_to_message(&err),
        "asset is locked"
    );
    m.assert_async().await;
}

#[tokio::test]
async fn network_failure_is_not_retried() {
    let retries = Arc::new(Mutex::new(0u32));
    let seen = Arc::clone(&retries);
    // Port 1 is reserved and refuses connections.
    let api = client("http://127.0.0.1:1").with_retry_notifier(Arc::new(move |_: u32, _: u32| {
        *seen.lock().unwrap() += 1;
    }));

    let err = api.list_assets().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(*retries.lock().unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unauthorized_clears_token_and_fires_hook() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("GET", "/v1/assets")
        .with_status(401)
        .with_body(r#"{"error":{"code":"UNAUTHORIZED","message":"session expired"}}"#)
        .expect(1)
        .create_async()
        .await;

    let hooked = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&hooked);
    let api = client(&server.url())
        .with_token(Some("stale".into()))
        .with_auth_error_hook(Arc::new(move |e: &ApiError| {
            seen.lock().unwrap().push(e.status());
        }));

    let err = api.list_assets().await.unwrap_err();
    assert!(err.is_auth());
    assert!(api.token().is_none());
    assert_eq!(*hooked.lock().unwrap(), vec![Some(401)]);
    m.assert_async().await;
}

#[tokio::test]
async fn login_stores_token() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("POST", "/v1/auth/login")
        .match_body(Matcher::Json(
            json!({"email": "ops@example.com", "password": "hunter2"}),
        ))
        .with_status(200)
        .with_body(r#"{"access_token":"tok-new"}"#)
        .create_async()
        .await;

    let api = client(&server.url());
    let outcome = api.login("ops@example.com", "hunter2").await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::Authenticated {
            access_token: "tok-new".into()
        }
    );
    assert_eq!(api.token().as_deref(), Some("tok-new"));
}

#[tokio::test]
async fn login_with_mfa_then_verify() {
    let mut server = mockito::Server::new_async().await;
    let _login = server
        .mock("POST", "/v1/auth/login")
        .with_status(200)
        .with_body(r#"{"mfa_required":true,"mfa_token":"mfa-1"}"#)
        .create_async()
        .await;
    let _verify = server
        .mock("POST", "/v1/auth/mfa/verify")
        .match_body(Matcher::Json(json!({"mfa_token": "mfa-1", "code": "123456"})))
        .with_status(200)
        .with_body(r#"{"access_token":"tok-mfa"}"#)
        .create_async()
        .await;

    let api = client(&server.url());
    let outcome = api.login("ops@example.com", "pw").await.unwrap();
    assert_eq!(
        outcome,
        LoginOutcome::MfaRequired {
            mfa_token: "mfa-1".into()
        }
    );
    assert!(api.token().is_none());

    assert_eq!(api.verify_mfa("mfa-1", "123456").await.unwrap(), "tok-mfa");
    assert_eq!(api.token().as_deref(), Some("tok-mfa"));
}

#[tokio::test]
async fn password_reset_and_email_verify() {
    let mut server = mockito::Server::new_async().await;
    let reset = server
        .mock("POST", "/v1/auth/password/reset")
        .match_body(Matcher::Json(json!({"email": "ops@example.com"})))
        .with_status(202)
        .create_async()
        .await;
    let verify = server
        .mock("POST", "/v1/auth/email/verify")
        .match_body(Matcher::Json(json!({"token": "ev-1"})))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let api = client(&server.url());
    api.request_password_reset("ops@example.com").await.unwrap();
    api.verify_email("ev-1").await.unwrap();
    reset.assert_async().await;
    verify.assert_async().await;
}
