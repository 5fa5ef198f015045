//! Break detection inside the lunch window.

use chrono::{NaiveDate, NaiveDateTime};

use crate::policy::AccountingPolicy;
use crate::segment::{WorkSegment, seconds_between};

/// Seconds of the lunch window on `date` not covered by any segment.
///
/// Segments must be ordered and non-overlapping, as produced by
/// [`build_segments`](crate::segment::build_segments). Three kinds of gap
/// are summed, each clipped to the window and clamped at zero: before the
/// first segment, between consecutive segments, and after the last one.
/// A day without segments has the whole window as gap.
pub fn lunch_gap_secs(segments: &[WorkSegment], date: NaiveDate, policy: &AccountingPolicy) -> f64 {
    let window_start = date.and_time(policy.lunch_window_start);
    let window_end = date.and_time(policy.lunch_window_end);

    let (Some(first), Some(last)) = (segments.first(), segments.last()) else {
        return clipped_gap(window_start, window_end, window_start, window_end);
    };

    let mut gap = 0.0;

    if first.start > window_start {
        gap += clipped_gap(window_start, first.start, window_start, window_end);
    }

    for pair in segments.windows(2) {
        gap += clipped_gap(pair[0].end, pair[1].start, window_start, window_end);
    }

    if last.end < window_end {
        gap += clipped_gap(last.end, window_end, window_start, window_end);
    }

    gap
}

/// Length of `[from, to]` intersected with `[window_start, window_end]`, or 0.
fn clipped_gap(
    from: NaiveDateTime,
    to: NaiveDateTime,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> f64 {
    let start = from.max(window_start);
    let end = to.min(window_end);
    if end > start {
        seconds_between(start, end)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskRef;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn seg(start: (u32, u32), end: (u32, u32)) -> WorkSegment {
        WorkSegment {
            start: date().and_hms_opt(start.0, start.1, 0).unwrap(),
            end: date().and_hms_opt(end.0, end.1, 0).unwrap(),
            task: TaskRef::new("A").unwrap(),
        }
    }

    fn gap(segments: &[WorkSegment]) -> f64 {
        lunch_gap_secs(segments, date(), &AccountingPolicy::default())
    }

    #[test]
    fn break_between_segments_inside_window() {
        let segments = [seg((10, 0), (11, 30)), seg((12, 30), (14, 0))];
        assert!((gap(&segments) - 3_600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_segments_means_whole_window() {
        assert!((gap(&[]) - 7_200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn continuous_work_has_no_gap() {
        assert!(gap(&[seg((7, 0), (15, 0))]).abs() < f64::EPSILON);
    }

    #[test]
    fn late_start_counts_leading_gap() {
        // 11:00 -> 11:45
        assert!((gap(&[seg((11, 45), (15, 0))]) - 2_700.0).abs() < f64::EPSILON);
        // First segment after the window: whole window
        assert!((gap(&[seg((13, 30), (15, 0))]) - 7_200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn early_finish_counts_trailing_gap() {
        // 12:40 -> 13:00
        assert!((gap(&[seg((7, 0), (12, 40))]) - 1_200.0).abs() < f64::EPSILON);
        // Finished before the window opened
        assert!((gap(&[seg((7, 0), (10, 0))]) - 7_200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gaps_outside_window_are_ignored() {
        let segments = [seg((7, 0), (9, 0)), seg((9, 30), (15, 0))];
        assert!(gap(&segments).abs() < f64::EPSILON);
    }

    #[test]
    fn gap_straddling_window_edge_is_clipped() {
        // 10:30 -> 11:20 contributes 11:00 -> 11:20
        let segments = [seg((7, 0), (10, 30)), seg((11, 20), (15, 0))];
        assert!((gap(&segments) - 1_200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn adjacent_segments_add_nothing() {
        let segments = [seg((8, 0), (12, 0)), seg((12, 0), (15, 0))];
        assert!(gap(&segments).abs() < f64::EPSILON);
    }

    #[test]
    fn several_short_breaks_add_up() {
        let segments = [
            seg((8, 0), (11, 10)),
            seg((11, 20), (12, 0)),
            seg((12, 15), (15, 0)),
        ];
        // 10 min + 15 min
        assert!((gap(&segments) - 1_500.0).abs() < f64::EPSILON);
    }
}
