//! Totals command: work time per task and per worker.
//!
//! This module implements `wt totals` with day/range selection and output
//! formats (human-readable, JSON). Totals are computed through the
//! [`TotalsCache`] so repeated queries over unchanged data are free.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use wt_core::{ClockEvent, TaskRef, TimeTotals, TotalsCache, WorkerId};
use wt_db::Database;

use super::util::{describe_range, format_duration};

/// Computed report data.
#[derive(Debug)]
pub struct TotalsReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub totals: Arc<TimeTotals>,
    /// Display name per worker ID, for workers with time in the report.
    pub worker_names: BTreeMap<String, String>,
}

/// Loads the clock events for the inclusive day range.
pub fn load_batch(db: &Database, from: NaiveDate, to: NaiveDate) -> Result<Vec<ClockEvent>> {
    db.events_for_days(from, to)
        .with_context(|| format!("failed to load clock events for {from}..={to}"))
}

/// Loads display names for the workers that appear in `totals`.
pub fn worker_names(db: &Database, totals: &TimeTotals) -> Result<BTreeMap<String, String>> {
    let names = db
        .workers()
        .context("failed to load worker names")?
        .into_iter()
        .filter(|w| totals.by_worker.contains_key(w.worker_id.as_str()))
        .map(|w| (w.worker_id, w.worker_name))
        .collect();
    Ok(names)
}

/// Generates report data from the database.
pub fn generate_report(
    db: &Database,
    cache: &TotalsCache,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<TotalsReport> {
    let events = load_batch(db, from, to)?;
    let totals = cache.totals(&events);
    let worker_names = worker_names(db, &totals)?;
    Ok(TotalsReport {
        from,
        to,
        totals,
        worker_names,
    })
}

/// Label for a worker: "Name (id)", or the bare id without a name.
pub fn worker_label(worker_id: &WorkerId, names: &BTreeMap<String, String>) -> String {
    match names.get(worker_id.as_str()) {
        Some(name) if !name.trim().is_empty() => format!("{} ({worker_id})", name.trim()),
        _ if worker_id.as_str().is_empty() => "(no worker)".to_string(),
        _ => worker_id.to_string(),
    }
}

/// Writes the human-readable report.
pub fn write_report<W: Write>(writer: &mut W, report: &TotalsReport) -> Result<()> {
    writeln!(writer, "WORK TIME: {}", describe_range(report.from, report.to))?;

    if report.totals.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "No work recorded for this period.")?;
        return Ok(());
    }

    writeln!(writer)?;
    writeln!(writer, "BY TASK")?;
    writeln!(writer, "───────")?;
    for (task, secs) in &report.totals.by_task {
        writeln!(writer, "  {:<20}{:>8}", task.as_str(), format_duration(*secs))?;
    }

    writeln!(writer)?;
    writeln!(writer, "BY WORKER")?;
    writeln!(writer, "─────────")?;
    for (worker_id, tasks) in &report.totals.by_worker {
        writeln!(writer, "  {}", worker_label(worker_id, &report.worker_names))?;
        for (task, secs) in tasks {
            writeln!(writer, "    {:<18}{:>8}", task.as_str(), format_duration(*secs))?;
        }
    }

    writeln!(writer)?;
    writeln!(
        writer,
        "{:<22}{:>8}",
        "TOTAL",
        format_duration(report.totals.total_secs())
    )?;

    Ok(())
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub period: JsonPeriod,
    pub by_task: &'a BTreeMap<TaskRef, f64>,
    pub by_worker: &'a BTreeMap<WorkerId, BTreeMap<TaskRef, f64>>,
    pub worker_names: &'a BTreeMap<String, String>,
    pub total_secs: f64,
}

#[derive(Debug, Serialize)]
pub struct JsonPeriod {
    pub start: String,
    pub end: String,
}

/// Writes report data as JSON.
pub fn write_report_json<W: Write>(writer: &mut W, report: &TotalsReport) -> Result<()> {
    let json = JsonReport {
        period: JsonPeriod {
            start: report.from.format("%Y-%m-%d").to_string(),
            end: report.to.format("%Y-%m-%d").to_string(),
        },
        by_task: &report.totals.by_task,
        by_worker: &report.totals.by_worker,
        worker_names: &report.worker_names,
        total_secs: report.totals.total_secs(),
    };
    serde_json::to_writer_pretty(&mut *writer, &json).context("failed to serialize totals")?;
    writeln!(writer)?;
    Ok(())
}

/// Runs the totals command.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    cache: &TotalsCache,
    from: NaiveDate,
    to: NaiveDate,
    json: bool,
) -> Result<()> {
    let report = generate_report(db, cache, from, to)?;
    if json {
        write_report_json(writer, &report)
    } else {
        write_report(writer, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn event(worker: &str, name: &str, at: &str, kind: &str, task: &str) -> ClockEvent {
        ClockEvent {
            worker_id: worker.into(),
            worker_name: name.into(),
            timestamp: at.parse().unwrap(),
            event_type: kind.into(),
            task_ref: Some(task.into()),
        }
    }

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event("1", "Ana Novak", "2025-03-04T08:00:00", "Start", "WO-1001"),
            event("2", "", "2025-03-04T09:00:00", "start", "WO-1001"),
            event("1", "Ana Novak", "2025-03-04T10:00:00", "začetek", "WO-1002"),
            event("2", "", "2025-03-04T09:30:00", "stop", "WO-1001"),
            event("1", "Ana Novak", "2025-03-04T10:45:00", "konec", "WO-1002"),
        ])
        .unwrap();
        db
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    fn render(db: &Database, cache: &TotalsCache, json: bool) -> String {
        let mut output = Vec::new();
        run(&mut output, db, cache, day(), day(), json).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn totals_report_lists_tasks_and_workers() {
        let db = seeded_db();
        let output = render(&db, &TotalsCache::default(), false);
        assert_snapshot!(output, @r"
        WORK TIME: Tuesday, Mar 4, 2025

        BY TASK
        ───────
          WO-1001               2h 30m
          WO-1002                  45m

        BY WORKER
        ─────────
          Ana Novak (1)
            WO-1001              2h 0m
            WO-1002                45m
          2
            WO-1001                30m

        TOTAL                   3h 15m
        ");
    }

    #[test]
    fn empty_period_says_so() {
        let db = Database::open_in_memory().unwrap();
        let output = render(&db, &TotalsCache::default(), false);
        assert_snapshot!(output, @r"
        WORK TIME: Tuesday, Mar 4, 2025

        No work recorded for this period.
        ");
    }

    #[test]
    fn json_report_exposes_both_mappings() {
        let db = seeded_db();
        let output = render(&db, &TotalsCache::default(), true);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["period"]["start"], "2025-03-04");
        assert_eq!(json["by_task"]["WO-1001"], 9_000.0);
        assert_eq!(json["by_task"]["WO-1002"], 2_700.0);
        assert_eq!(json["by_worker"]["1"]["WO-1001"], 7_200.0);
        assert_eq!(json["by_worker"]["2"]["WO-1001"], 1_800.0);
        assert_eq!(json["worker_names"]["1"], "Ana Novak");
        assert_eq!(json["total_secs"], 11_700.0);
    }

    #[test]
    fn repeated_report_hits_cache() {
        let db = seeded_db();
        let cache = TotalsCache::default();
        let first = generate_report(&db, &cache, day(), day()).unwrap();
        let second = generate_report(&db, &cache, day(), day()).unwrap();

        assert!(Arc::ptr_eq(&first.totals, &second.totals));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn worker_label_falls_back_to_id() {
        let names = BTreeMap::from([
            ("1".to_string(), "Ana".to_string()),
            ("2".to_string(), " ".to_string()),
        ]);
        assert_eq!(worker_label(&WorkerId::new("1"), &names), "Ana (1)");
        assert_eq!(worker_label(&WorkerId::new("2"), &names), "2");
        assert_eq!(worker_label(&WorkerId::new("3"), &names), "3");
        assert_eq!(worker_label(&WorkerId::new(""), &names), "(no worker)");
    }
}
