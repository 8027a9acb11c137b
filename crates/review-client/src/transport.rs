//! One HTTP request helper shared by every backend call.
//!
//! Non-2xx responses become [`ApiError::Http`] from the backend's error
//! payload. Retryable failures are re-sent up to `max_attempts` times with
//! exponential backoff; 429s also get jitter and honor `Retry-After`. A 401
//! clears the bearer token and fires the auth-error hook.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, Url};
use review_core::config::RetryConfig;
use review_core::ApiError;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ClientError;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Called before each retry with `(next_attempt, max_attempts)`.
pub type RetryNotifier = dyn Fn(u32, u32) + Send + Sync;

/// Called once per 401 response, after the token has been cleared.
pub type AuthErrorHook = dyn Fn(&ApiError) + Send + Sync;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_millis(cfg.base_delay_ms),
        }
    }

    /// Delay before re-sending after failed attempt number `attempt` (1-based).
    pub fn backoff(
        &self,
        attempt: u32,
        error: &ApiError,
        retry_after: Option<Duration>,
    ) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        let delay = self.base_delay.saturating_mul(factor);
        if !error.is_rate_limited() {
            return delay;
        }

        let base_ms = self.base_delay.as_millis() as u64;
        let jitter = if base_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..base_ms)
        };
        let delay = delay + Duration::from_millis(jitter);
        match retry_after {
            Some(server_delay) if server_delay > delay => server_delay,
            _ => delay,
        }
    }
}

// ---------------------------------------------------------------------------
// Error payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    retryable: Option<bool>,
    #[serde(default)]
    correlation_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

/// Build an [`ApiError::Http`] from a non-2xx body.
///
/// Accepts `{error: {...}}` or the fields at top level; anything else yields
/// an error with an empty message. The payload's correlation id wins over the
/// response header's.
pub fn parse_error_response(
    status: u16,
    header_correlation_id: Option<String>,
    body: &str,
) -> ApiError {
    let payload = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error)
        .or_else(|_| serde_json::from_str::<ErrorPayload>(body))
        .unwrap_or_default();

    ApiError::Http {
        status,
        code: payload.code.unwrap_or_else(|| "UNKNOWN".to_string()),
        message: payload.message.unwrap_or_default(),
        retryable: payload.retryable.unwrap_or(false),
        correlation_id: payload.correlation_id.or(header_correlation_id),
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let secs = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse::<u64>().ok()?;
    Some(Duration::from_secs(secs))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

struct Failure {
    error: ApiError,
    retry_after: Option<Duration>,
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Self {
            error,
            retry_after: None,
        }
    }
}

pub struct Transport {
    http: reqwest::Client,
    base: Url,
    policy: RetryPolicy,
    token: RwLock<Option<String>>,
    on_retry: Option<Arc<RetryNotifier>>,
    on_auth_error: Option<Arc<AuthErrorHook>>,
}

impl Transport {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self, ClientError> {
        let base = Url::parse(base_url.trim())
            .map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base,
            policy,
            token: RwLock::new(None),
            on_retry: None,
            on_auth_error: None,
        })
    }

    pub fn with_retry_notifier(mut self, notifier: Arc<RetryNotifier>) -> Self {
        self.on_retry = Some(notifier);
        self
    }

    pub fn with_auth_error_hook(mut self, hook: Arc<AuthErrorHook>) -> Self {
        self.on_auth_error = Some(hook);
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// `base` joined with `segments`, each percent-encoded.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::Validation(format!("base url {} cannot take a path", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get(&self, segments: &[&str]) -> Result<Value, ApiError> {
        self.request(Method::GET, segments, None, None).await
    }

    pub async fn post(
        &self,
        segments: &[&str],
        body: Option<&Value>,
        idempotency_key: Option<&str>,
    ) -> Result<Value, ApiError> {
        self.request(Method::POST, segments, body, idempotency_key)
            .await
    }

    /// Send one logical request, retrying per the policy. An empty 2xx body
    /// yields `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
        idempotency_key: Option<&str>,
    ) -> Result<Value, ApiError> {
        let url = self.url(segments)?;
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            let failure = match self
                .send_once(method.clone(), url.clone(), body, idempotency_key)
                .await
            {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };
            let error = failure.error;

            if error.is_auth() {
                warn!(%url, "request unauthorized; clearing session token");
                self.set_token(None);
                if let Some(hook) = &self.on_auth_error {
                    hook(&error);
                }
                return Err(error);
            }
            if !error.is_retryable() || attempt >= max_attempts {
                return Err(error);
            }

            let delay = self.policy.backoff(attempt, &error, failure.retry_after);
            debug!(%url, attempt, max_attempts, ?delay, error = %error, "retrying request");
            if let Some(notify) = &self.on_retry {
                notify(attempt + 1, max_attempts);
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
        idempotency_key: Option<&str>,
    ) -> Result<Value, Failure> {
        let mut req = self.http.request(method, url);
        if let Some(token) = self.token() {
            req = req.bearer_auth(token);
        }
        if let Some(key) = idempotency_key {
            req = req.header(IDEMPOTENCY_KEY_HEADER, key);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Failure {
                error: parse_error_response(
                    status.as_u16(),
                    header_string(&headers, CORRELATION_ID_HEADER),
                    &text,
                ),
                retry_after: retry_after(&headers),
            });
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| Failure::from(ApiError::Validation(format!("response body: {e}"))))
    }
}
