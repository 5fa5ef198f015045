//! Days command: per worker-day accounting figures.
//!
//! Shows what the totals are made of, so a disputed deduction can be traced
//! back to the lunch gap that caused it.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use wt_core::{AccountingPolicy, DailyTotals, daily_totals};
use wt_db::Database;

use super::totals::{load_batch, worker_label};
use super::util::{describe_range, format_duration};

/// Writes the human-readable breakdown.
pub fn write_days<W: Write>(
    writer: &mut W,
    from: NaiveDate,
    to: NaiveDate,
    days: &[DailyTotals],
    names: &BTreeMap<String, String>,
) -> Result<()> {
    writeln!(writer, "WORKER DAYS: {}", describe_range(from, to))?;

    if days.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No work recorded for this period.")?;
        return Ok(());
    }

    for day in days {
        writeln!(writer)?;
        writeln!(
            writer,
            "{}  {}",
            day.worker_day.date.format("%Y-%m-%d"),
            worker_label(&day.worker_day.worker_id, names)
        )?;
        writeln!(
            writer,
            "  Worked: {}  Lunch gap: {}  Deducted: {}",
            format_duration(day.total_secs),
            format_duration(day.lunch_gap_secs),
            format_duration(day.deduction.seconds)
        )?;
        for (task, secs) in day.adjusted_task_secs() {
            writeln!(writer, "    {:<18}{:>8}", task.as_str(), format_duration(secs))?;
        }
    }

    Ok(())
}

/// Runs the days command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    policy: &AccountingPolicy,
    from: NaiveDate,
    to: NaiveDate,
    json: bool,
) -> Result<()> {
    let events = load_batch(db, from, to)?;
    let days = daily_totals(&events, policy);

    if json {
        serde_json::to_writer_pretty(&mut *writer, &days).context("failed to serialize days")?;
        writeln!(writer)?;
        return Ok(());
    }

    let names = db
        .workers()
        .context("failed to load worker names")?
        .into_iter()
        .filter(|w| days.iter().any(|d| d.worker_day.worker_id.as_str() == w.worker_id))
        .map(|w| (w.worker_id, w.worker_name))
        .collect();
    write_days(writer, from, to, &days, &names)
}
