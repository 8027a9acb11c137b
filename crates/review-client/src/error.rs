use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url '{0}': expected http:// or https://")]
    InvalidBaseUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),

    #[error(transparent)]
    Api(#[from] review_core::ApiError),
}
