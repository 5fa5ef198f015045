//! Per-day accounting policy.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Constants applied to every worker-day.
///
/// The defaults are the workshop rules: open segments close at 15:00, the
/// lunch window is 11:00-13:00, and days over six hours owe a 30 minute break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountingPolicy {
    /// Where a segment left open at the end of the day is closed.
    /// Segments opened at or after this time are dropped instead.
    pub auto_close_at: NaiveTime,

    /// Start of the window in which break gaps are measured.
    pub lunch_window_start: NaiveTime,

    /// End of the break window.
    pub lunch_window_end: NaiveTime,

    /// Raw work above this many seconds triggers the break rule.
    /// Default: 21600 (6 hours).
    pub break_threshold_secs: u32,

    /// Break owed once the threshold is exceeded.
    /// Default: 1800 (30 minutes).
    pub full_break_secs: u32,
}

impl Default for AccountingPolicy {
    fn default() -> Self {
        Self {
            auto_close_at: hm(15, 0),
            lunch_window_start: hm(11, 0),
            lunch_window_end: hm(13, 0),
            break_threshold_secs: 21_600, // 6 hours
            full_break_secs: 1_800,       // 30 minutes
        }
    }
}

fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_workshop_rules() {
        let policy = AccountingPolicy::default();
        assert_eq!(policy.auto_close_at.to_string(), "15:00:00");
        assert_eq!(policy.lunch_window_start.to_string(), "11:00:00");
        assert_eq!(policy.lunch_window_end.to_string(), "13:00:00");
        assert_eq!(policy.break_threshold_secs, 21_600);
        assert_eq!(policy.full_break_secs, 1_800);
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let policy: AccountingPolicy =
            serde_json::from_str(r#"{"auto_close_at":"16:30:00"}"#).unwrap();
        assert_eq!(policy.auto_close_at.to_string(), "16:30:00");
        assert_eq!(policy.full_break_secs, 1_800);
    }
}
