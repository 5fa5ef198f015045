//! Work segment construction for one worker-day.

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::clock_action::ClockAction;
use crate::normalize::DayEvent;
use crate::types::TaskRef;

/// A closed interval of work on one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkSegment {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub task: TaskRef,
}

impl WorkSegment {
    /// Length of the segment in seconds. Never negative.
    pub fn duration_secs(&self) -> f64 {
        seconds_between(self.start, self.end).max(0.0)
    }
}

/// Segment currently being worked on.
#[derive(Debug)]
struct OpenSegment {
    start: NaiveDateTime,
    task: TaskRef,
}

/// Turns one worker-day's events into ordered, non-overlapping segments.
///
/// A Start while a segment is open is a task switch: the open segment closes
/// at the new Start. A Stop without an open segment is ignored. A segment still
/// open after the last event is closed at `auto_close_at` on its start date,
/// unless it started at or after that time, in which case it is dropped.
///
/// Zero-length segments are kept; they count for gap analysis but not totals.
pub fn build_segments(events: &[DayEvent], auto_close_at: NaiveTime) -> Vec<WorkSegment> {
    let mut ordered: Vec<&DayEvent> = events.iter().collect();
    // Stable: equal timestamps keep input order.
    ordered.sort_by_key(|event| event.timestamp);

    let mut segments = Vec::new();
    let mut open: Option<OpenSegment> = None;

    for event in ordered {
        match event.action {
            Some(ClockAction::Start) => {
                if let Some(previous) = open.take() {
                    segments.push(WorkSegment {
                        start: previous.start,
                        end: event.timestamp,
                        task: previous.task,
                    });
                }
                open = Some(OpenSegment {
                    start: event.timestamp,
                    task: event.task.clone(),
                });
            }
            Some(ClockAction::Stop) => {
                if let Some(previous) = open.take() {
                    segments.push(WorkSegment {
                        start: previous.start,
                        end: event.timestamp,
                        task: previous.task,
                    });
                }
            }
            None => {}
        }
    }

    // Forgotten clock-out
    if let Some(trailing) = open {
        let cutoff = trailing.start.date().and_time(auto_close_at);
        if trailing.start < cutoff {
            segments.push(WorkSegment {
                start: trailing.start,
                end: cutoff,
                task: trailing.task,
            });
        } else {
            tracing::debug!(
                start = %trailing.start,
                task = %trailing.task,
                "dropping open segment started after auto-close cutoff"
            );
        }
    }

    segments
}

/// Signed seconds from `start` to `end`, with sub-second precision.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn seconds_between(start: NaiveDateTime, end: NaiveDateTime) -> f64 {
    let delta = end - start;
    delta.num_microseconds().map_or_else(
        || delta.num_milliseconds() as f64 / 1_000.0,
        |micros| micros as f64 / 1_000_000.0,
    )
}
