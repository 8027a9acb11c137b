use serde::{Deserialize, Serialize};

use crate::i18n::Translate;
use crate::types::StatusKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePhase {
    pub active: bool,
    pub done: bool,
    #[serde(default)]
    pub error: bool,
    pub label: String,
}

/// The queued → running → done progress strip, derived from live state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTimeline {
    pub queued: TimelinePhase,
    pub running: TimelinePhase,
    pub done: TimelinePhase,
}

pub fn batch_timeline(
    has_pending: bool,
    executing_batch: bool,
    execute_status: Option<StatusKind>,
    t: &dyn Translate,
) -> BatchTimeline {
    let succeeded = execute_status == Some(StatusKind::Success);
    let failed = execute_status == Some(StatusKind::Error);
    let settled = !has_pending && !executing_batch;

    BatchTimeline {
        queued: TimelinePhase {
            active: has_pending,
            done: !has_pending && (executing_batch || succeeded || failed),
            error: false,
            label: t.translate("timeline.queued", &[]),
        },
        running: TimelinePhase {
            active: executing_batch,
            done: !executing_batch && (succeeded || failed),
            error: false,
            label: t.translate("timeline.running", &[]),
        },
        done: TimelinePhase {
            active: succeeded && settled,
            done: succeeded && settled,
            error: failed,
            label: if failed {
                t.translate("timeline.failed", &[])
            } else {
                t.translate("timeline.done", &[])
            },
        },
    }
}
