use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use review_core::status::map_error_to_message;
use review_core::{ApiError, ReviewError};

/// Carries an explicit 404 through the `anyhow::Error` chain.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

/// Carries an explicit 400 through the `anyhow::Error` chain.
#[derive(Debug)]
struct BadRequestError(String);

impl std::fmt::Display for BadRequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequestError {}

// ---------------------------------------------------------------------------
// AppError
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(e) = self.0.downcast_ref::<NotFoundError>() {
            return error_body(StatusCode::NOT_FOUND, e.0.clone());
        }
        if let Some(e) = self.0.downcast_ref::<BadRequestError>() {
            return error_body(StatusCode::BAD_REQUEST, e.0.clone());
        }
        // Backend failures never leak raw payloads to the dashboard.
        if let Some(e) = self.0.downcast_ref::<ApiError>() {
            let status = match e {
                ApiError::Http { status: 401, .. } => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            };
            return error_body(status, map_error_to_message(e));
        }

        let status = match self.0.downcast_ref::<ReviewError>() {
            Some(
                ReviewError::NotInitialized
                | ReviewError::InvalidConfig(_)
                | ReviewError::UnknownExportFormat(_)
                | ReviewError::UnknownAction(_),
            ) => StatusCode::BAD_REQUEST,
            Some(ReviewError::Io(_) | ReviewError::Yaml(_) | ReviewError::Json(_)) | None => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_body(status, self.0.to_string())
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    let body = serde_json::json!({ "error": message });
    (status, axum::Json(body)).into_response()
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
