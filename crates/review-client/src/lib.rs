//! `review-client`: HTTP implementation of [`review_core::ReviewApi`].
//!
//! ```text
//! ApiClient   ← ReviewApi + AuthApi over /v1 paths
//!     │
//!     ▼
//! Transport   ← bearer token, Idempotency-Key, retry/backoff, 401 hook
//!     │
//!     ▼
//! reqwest
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod transport;

pub use auth::{AuthApi, LoginOutcome};
pub use client::ApiClient;
pub use error::ClientError;
pub use transport::{RetryPolicy, Transport};
