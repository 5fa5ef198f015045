//! Core domain logic for work-time accounting.
//!
//! This crate contains the fundamental types and logic for:
//! - Clock events: raw start/stop actions tagged with a task reference
//! - Accounting: turning a batch of events into per-task and per-worker totals
//! - Caching: memoizing totals for repeated identical batches

mod accounting;
pub mod cache;
pub mod clock_action;
mod deduction;
mod event;
mod lunch;
mod normalize;
mod policy;
mod segment;
mod types;

pub use accounting::{DailyTotals, TimeTotals, calculate_time_totals, daily_totals};
pub use cache::{CacheStats, TotalsCache};
pub use clock_action::{ClockAction, UnknownClockAction};
pub use deduction::{Deduction, compute_deduction};
pub use event::ClockEvent;
pub use lunch::lunch_gap_secs;
pub use normalize::{DayEvent, WorkerDay, group_by_worker_day};
pub use policy::AccountingPolicy;
pub use segment::{WorkSegment, build_segments};
pub use types::{TaskRef, ValidationError, WorkerId};
