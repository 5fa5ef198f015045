//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use regex::Regex;

use crate::cli::DateRangeArgs;

/// Pre-compiled regex for relative day parsing.
static RELATIVE_DAY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(day|week)s?\s+ago$").unwrap());

/// Conservative bound for relative day parsing (~100 years).
const MAX_RELATIVE_DAYS: i64 = 100 * 366;

/// Parse a date string relative to `today`.
///
/// Supports:
/// - ISO 8601: "2025-03-04"
/// - Keywords: "today", "yesterday"
/// - Relative: "3 days ago", "1 week ago"
pub fn parse_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    match s {
        "today" => return Ok(today),
        "yesterday" => return Ok(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }

    let Some(caps) = RELATIVE_DAY_RE.captures(s) else {
        anyhow::bail!(
            "Invalid date: {s}. Use YYYY-MM-DD (e.g., 2025-03-04), 'today', 'yesterday', or relative (e.g., '3 days ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative date")?;

    let days_per_unit = match &caps[2] {
        "day" => 1,
        "week" => 7,
        unit => anyhow::bail!("Unknown date unit: {unit}"),
    };

    if n > MAX_RELATIVE_DAYS / days_per_unit {
        anyhow::bail!("Relative date value too large: {n} {}", &caps[2]);
    }

    Ok(today - Duration::days(n * days_per_unit))
}

/// Resolves the inclusive day range selected on the command line.
pub fn resolve_range(
    args: &DateRangeArgs,
    today: NaiveDate,
) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    if let (Some(from), Some(to)) = (&args.from, &args.to) {
        let from = parse_date(from, today).context("invalid --from")?;
        let to = parse_date(to, today).context("invalid --to")?;
        if from > to {
            anyhow::bail!("--from {from} is after --to {to}");
        }
        return Ok((from, to));
    }

    let day = match &args.date {
        Some(date) => parse_date(date, today).context("invalid --date")?,
        None => today,
    };
    Ok((day, day))
}

/// Formats seconds as "Xh Ym" if >= 1 hour, "Xm" otherwise.
/// Rounds to the nearest minute; negative input is treated as 0m.
#[allow(clippy::cast_possible_truncation)]
pub fn format_duration(secs: f64) -> String {
    if !secs.is_finite() || secs <= 0.0 {
        return "0m".to_string();
    }
    let total_minutes = (secs / 60.0).round() as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Describes a day range for report headers.
pub fn describe_range(from: NaiveDate, to: NaiveDate) -> String {
    if from == to {
        from.format("%A, %b %-d, %Y").to_string()
    } else {
        format!("{} to {}", from.format("%b %-d, %Y"), to.format("%b %-d, %Y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn parses_iso_and_keywords() {
        assert_eq!(parse_date("2025-03-04", today()).unwrap(), date("2025-03-04"));
        assert_eq!(parse_date("today", today()).unwrap(), today());
        assert_eq!(parse_date("yesterday", today()).unwrap(), date("2025-03-11"));
    }

    #[test]
    fn parses_relative_days() {
        assert_eq!(parse_date("3 days ago", today()).unwrap(), date("2025-03-09"));
        assert_eq!(parse_date("1 week ago", today()).unwrap(), date("2025-03-05"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_date("next tuesday", today()).is_err());
        assert!(parse_date("99999999 days ago", today()).is_err());
    }

    #[test]
    fn range_defaults_to_today() {
        let range = resolve_range(&DateRangeArgs::default(), today()).unwrap();
        assert_eq!(range, (today(), today()));
    }

    #[test]
    fn range_rejects_inverted_bounds() {
        let args = DateRangeArgs {
            date: None,
            from: Some("2025-03-05".into()),
            to: Some("2025-03-04".into()),
        };
        assert!(resolve_range(&args, today()).is_err());
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0.0), "0m");
        assert_eq!(format_duration(-5.0), "0m");
        assert_eq!(format_duration(2_700.0), "45m");
        assert_eq!(format_duration(3_600.0), "1h 0m");
        assert_eq!(format_duration(27_000.0), "7h 30m");
        // 19801 s is 330.02 minutes
        assert_eq!(format_duration(19_801.0), "5h 30m");
    }

    #[test]
    fn describes_ranges() {
        assert_eq!(describe_range(date("2025-03-04"), date("2025-03-04")), "Tuesday, Mar 4, 2025");
        assert_eq!(
            describe_range(date("2025-03-03"), date("2025-03-05")),
            "Mar 3, 2025 to Mar 5, 2025"
        );
    }
}
