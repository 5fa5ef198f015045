//! Event normalization: filtering and worker-day grouping.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::clock_action::ClockAction;
use crate::event::ClockEvent;
use crate::types::{TaskRef, WorkerId};

/// One worker on one calendar date. All per-day policy is scoped to this key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WorkerDay {
    pub worker_id: WorkerId,
    pub date: NaiveDate,
}

/// A clock event that survived normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEvent {
    pub timestamp: NaiveDateTime,
    /// `None` for event types outside both synonym sets.
    pub action: Option<ClockAction>,
    pub task: TaskRef,
}

/// Drops events without a task reference and groups the rest by worker-day.
///
/// Events keep their input order inside a group; chronological order is the
/// segment builder's job. Groups come back in key order so that callers
/// folding over them accumulate in a fixed order.
pub fn group_by_worker_day(events: &[ClockEvent]) -> BTreeMap<WorkerDay, Vec<DayEvent>> {
    let mut groups: BTreeMap<WorkerDay, Vec<DayEvent>> = BTreeMap::new();
    let mut dropped = 0_usize;

    for event in events {
        let Some(task) = event.task_ref().and_then(|task| TaskRef::new(task).ok()) else {
            dropped += 1;
            continue;
        };
        let key = WorkerDay {
            worker_id: WorkerId::new(event.worker_id.as_str()),
            date: event.timestamp.date(),
        };
        groups.entry(key).or_default().push(DayEvent {
            timestamp: event.timestamp,
            action: event.action(),
            task,
        });
    }

    if dropped > 0 {
        tracing::debug!(dropped, "skipped events without task reference");
    }

    groups
}
