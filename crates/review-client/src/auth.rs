use async_trait::async_trait;
use review_core::ApiError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::client::{to_body, ApiClient};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoginOutcome {
    Authenticated { access_token: String },
    MfaRequired { mfa_token: String },
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    mfa_required: bool,
    #[serde(default)]
    mfa_token: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

fn parse<T: for<'de> Deserialize<'de>>(body: Value, what: &str) -> Result<T, ApiError> {
    serde_json::from_value(body).map_err(|e| ApiError::Validation(format!("{what}: {e}")))
}

/// Account flows. Successful logins store the bearer token on the client.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError>;

    /// Complete a login that answered [`LoginOutcome::MfaRequired`].
    async fn verify_mfa(&self, mfa_token: &str, code: &str) -> Result<String, ApiError>;

    async fn request_password_reset(&self, email: &str) -> Result<(), ApiError>;

    async fn verify_email(&self, token: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        let body = to_body(&LoginRequest { email, password })?;
        let resp: LoginResponse = parse(
            self.transport()
                .post(&["v1", "auth", "login"], Some(&body), None)
                .await?,
            "login response",
        )?;

        if resp.mfa_required {
            let mfa_token = resp
                .mfa_token
                .ok_or_else(|| ApiError::Validation("login response: missing mfa_token".into()))?;
            return Ok(LoginOutcome::MfaRequired { mfa_token });
        }
        let access_token = resp
            .access_token
            .ok_or_else(|| ApiError::Validation("login response: missing access_token".into()))?;
        self.set_token(Some(access_token.clone()));
        info!(%email, "logged in");
        Ok(LoginOutcome::Authenticated { access_token })
    }

    async fn verify_mfa(&self, mfa_token: &str, code: &str) -> Result<String, ApiError> {
        let body = json!({"mfa_token": mfa_token, "code": code});
        let resp: TokenResponse = parse(
            self.transport()
                .post(&["v1", "auth", "mfa", "verify"], Some(&body), None)
                .await?,
            "mfa response",
        )?;
        self.set_token(Some(resp.access_token.clone()));
        Ok(resp.access_token)
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let body = json!({"email": email});
        self.transport()
            .post(&["v1", "auth", "password", "reset"], Some(&body), None)
            .await?;
        Ok(())
    }

    async fn verify_email(&self, token: &str) -> Result<(), ApiError> {
        let body = json!({"token": token});
        self.transport()
            .post(&["v1", "auth", "email", "verify"], Some(&body), None)
            .await?;
        Ok(())
    }
}
