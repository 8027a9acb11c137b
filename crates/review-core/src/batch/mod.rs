//! Batch-move orchestration.
//!
//! Lifecycle: `Idle → Queued → Running → Reported`. `Queued` may be canceled
//! back to `Idle`; a failed execution leaves an error status and returns to
//! `Idle`. [`BatchController`] owns the mutable state; [`batch_timeline`]
//! projects it into the three-phase progress strip.

pub mod controller;
pub mod timeline;

pub use controller::{BatchController, BatchSnapshot};
pub use timeline::{batch_timeline, BatchTimeline, TimelinePhase};
