pub mod api;
pub mod batch;
pub mod board;
pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod feed;
pub mod i18n;
pub mod io;
pub mod paths;
pub mod planner;
pub mod purge;
pub mod report;
pub mod session;
pub mod status;
pub mod types;

pub use api::ReviewApi;
pub use context::ReviewContext;
pub use error::{ApiError, Result, ReviewError};
