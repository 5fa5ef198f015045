//! Work-time accounting pipeline.
//!
//! Converts a batch of raw clock events into per-task and per-worker totals.
//!
//! # Algorithm Summary
//!
//! 1. Drop events without a task reference, group by (worker, date)
//! 2. Per worker-day, build task segments from the start/stop log
//! 3. Measure the uncovered part of the lunch window
//! 4. Deduct the break shortfall on long days as a uniform shrink ratio
//! 5. Accumulate adjusted seconds per task and per (worker, task)
//!
//! The pipeline is a pure function of its input: no I/O, no shared state.
//! See [`TotalsCache`](crate::cache::TotalsCache) for the memoized entry point.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::deduction::{Deduction, compute_deduction};
use crate::event::ClockEvent;
use crate::lunch::lunch_gap_secs;
use crate::normalize::{WorkerDay, group_by_worker_day};
use crate::policy::AccountingPolicy;
use crate::segment::build_segments;
use crate::types::{TaskRef, WorkerId};

/// Intermediate figures for one worker-day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub worker_day: WorkerDay,

    /// Raw seconds per task, before any deduction.
    pub task_secs: BTreeMap<TaskRef, f64>,

    /// Sum of all raw segment durations.
    pub total_secs: f64,

    /// Uncovered seconds inside the lunch window.
    pub lunch_gap_secs: f64,

    /// Break deduction applied to this day.
    pub deduction: Deduction,
}

impl DailyTotals {
    /// Task seconds after applying the day's shrink ratio.
    pub fn adjusted_task_secs(&self) -> impl Iterator<Item = (&TaskRef, f64)> + '_ {
        self.task_secs
            .iter()
            .map(|(task, secs)| (task, secs * self.deduction.ratio))
    }

    /// Day total after deduction.
    pub fn adjusted_total_secs(&self) -> f64 {
        self.adjusted_task_secs().map(|(_, secs)| secs).sum()
    }
}

/// Accumulated totals for a batch of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeTotals {
    /// Seconds per task, across all workers and days.
    pub by_task: BTreeMap<TaskRef, f64>,

    /// Seconds per worker and task, across days.
    pub by_worker: BTreeMap<WorkerId, BTreeMap<TaskRef, f64>>,
}

impl TimeTotals {
    /// Seconds across all tasks.
    pub fn total_secs(&self) -> f64 {
        self.by_task.values().sum()
    }

    /// Returns true if no task received any time.
    pub fn is_empty(&self) -> bool {
        self.by_task.is_empty()
    }

    /// Adds one worker-day's adjusted seconds.
    fn add_day(&mut self, day: &DailyTotals) {
        // Days without credited time leave no trace in either mapping.
        if day.task_secs.is_empty() {
            return;
        }
        let worker_tasks = self
            .by_worker
            .entry(day.worker_day.worker_id.clone())
            .or_default();

        for (task, secs) in day.adjusted_task_secs() {
            *self.by_task.entry(task.clone()).or_insert(0.0) += secs;
            *worker_tasks.entry(task.clone()).or_insert(0.0) += secs;
        }
    }
}

/// Computes the per-worker-day figures for a batch, in (worker, date) order.
pub fn daily_totals(events: &[ClockEvent], policy: &AccountingPolicy) -> Vec<DailyTotals> {
    group_by_worker_day(events)
        .into_iter()
        .map(|(worker_day, day_events)| {
            let segments = build_segments(&day_events, policy.auto_close_at);

            let mut task_secs: BTreeMap<TaskRef, f64> = BTreeMap::new();
            let mut total_secs = 0.0;
            for segment in &segments {
                let duration = segment.duration_secs();
                if duration > 0.0 {
                    *task_secs.entry(segment.task.clone()).or_insert(0.0) += duration;
                    total_secs += duration;
                }
            }

            let gap = lunch_gap_secs(&segments, worker_day.date, policy);
            let deduction = compute_deduction(total_secs, gap, policy);

            tracing::debug!(
                worker = %worker_day.worker_id,
                date = %worker_day.date,
                segments = segments.len(),
                total_secs,
                lunch_gap_secs = gap,
                deduction_secs = deduction.seconds,
                "computed worker-day"
            );

            DailyTotals {
                worker_day,
                task_secs,
                total_secs,
                lunch_gap_secs: gap,
                deduction,
            }
        })
        .collect()
}

/// Calculates adjusted totals per task and per (worker, task) for a batch.
///
/// Events may arrive in any order. Events without a task reference, with
/// unknown event types, or with unmatched stops are absorbed without error.
pub fn calculate_time_totals(events: &[ClockEvent], policy: &AccountingPolicy) -> TimeTotals {
    let mut totals = TimeTotals::default();
    for day in daily_totals(events, policy) {
        totals.add_day(&day);
    }
    totals
}
