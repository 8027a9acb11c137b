use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("not initialized: run 'review init'")]
    NotInitialized,

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown export format '{0}': expected json or csv")]
    UnknownExportFormat(String),

    #[error("unknown decision action '{0}': expected keep or reject")]
    UnknownAction(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReviewError>;

// ---------------------------------------------------------------------------
// ApiError: failures reported by the DAM backend or the transport
// ---------------------------------------------------------------------------

/// Backend error codes that mark a 429 response as safe to retry.
pub const RETRYABLE_RATE_LIMIT_CODES: &[&str] = &["RATE_LIMITED", "TOO_MANY_REQUESTS"];

/// Code the backend uses for transient outages regardless of status.
pub const TEMPORARY_UNAVAILABLE: &str = "TEMPORARY_UNAVAILABLE";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Non-2xx response carrying the backend's structured error payload.
    #[error("HTTP {status} {code}: {message}")]
    Http {
        status: u16,
        code: String,
        message: String,
        retryable: bool,
        correlation_id: Option<String>,
    },

    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// A 2xx response whose body did not match the expected shape.
    #[error("invalid response: {0}")]
    Validation(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the transport is allowed to retry this failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http {
                status,
                code,
                retryable,
                ..
            } => {
                *retryable
                    || code == TEMPORARY_UNAVAILABLE
                    || (*status == 429 && RETRYABLE_RATE_LIMIT_CODES.contains(&code.as_str()))
                    || (500..600).contains(status)
            }
            Self::Network(_) | Self::Validation(_) => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// `true` for responses that mean the session is no longer valid.
    pub fn is_auth(&self) -> bool {
        self.status() == Some(401)
    }
}
