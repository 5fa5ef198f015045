//! Statutory break deduction.
//!
//! A worker-day with more than `break_threshold_secs` of raw work owes a
//! `full_break_secs` break. Time already left uncovered inside the lunch
//! window counts toward it; only the shortfall is deducted. The deduction is
//! expressed as a shrink ratio applied uniformly to every task of the day,
//! because the log cannot tell which task the break interrupted.

use serde::Serialize;

use crate::policy::AccountingPolicy;

/// Break deduction for one worker-day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deduction {
    /// Seconds removed from the day's total.
    pub seconds: f64,
    /// Multiplier for each task's raw seconds, in `[0.0, 1.0]`.
    pub ratio: f64,
}

impl Deduction {
    /// No deduction; raw time stands.
    pub const NONE: Self = Self {
        seconds: 0.0,
        ratio: 1.0,
    };
}

/// Computes the deduction for a day with `total_secs` of raw work and
/// `lunch_gap_secs` of uncovered lunch window.
///
/// The threshold comparison is strict: a day of exactly the threshold owes nothing.
pub fn compute_deduction(
    total_secs: f64,
    lunch_gap_secs: f64,
    policy: &AccountingPolicy,
) -> Deduction {
    let threshold = f64::from(policy.break_threshold_secs);
    let full_break = f64::from(policy.full_break_secs);

    if total_secs <= threshold || lunch_gap_secs >= full_break {
        return Deduction::NONE;
    }

    let seconds = full_break - lunch_gap_secs;
    if seconds <= 0.0 {
        return Deduction::NONE;
    }

    // Keeps totals non-negative when a custom policy deducts more than was worked.
    let ratio = if total_secs <= seconds {
        0.0
    } else {
        (total_secs - seconds) / total_secs
    };

    Deduction { seconds, ratio }
}
