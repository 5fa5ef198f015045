//! Watch command: poll the store and reprint totals when they change.
//!
//! Each poll reloads the day's batch and asks the [`TotalsCache`]. While no
//! new events arrive the batch is identical, the cache hits, and nothing is
//! printed.

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use wt_core::{TimeTotals, TotalsCache};
use wt_db::Database;

use super::totals::{TotalsReport, load_batch, worker_names, write_report};

/// Polling state for one watched day.
pub struct Watcher<'a> {
    db: &'a Database,
    cache: &'a TotalsCache,
    date: NaiveDate,
    last: Option<Arc<TimeTotals>>,
}

impl<'a> Watcher<'a> {
    pub const fn new(db: &'a Database, cache: &'a TotalsCache, date: NaiveDate) -> Self {
        Self {
            db,
            cache,
            date,
            last: None,
        }
    }

    /// Polls once. Returns the new totals if they differ from the last poll.
    pub fn poll(&mut self) -> Result<Option<Arc<TimeTotals>>> {
        let events = load_batch(self.db, self.date, self.date)?;
        let totals = self.cache.totals(&events);

        let unchanged = self
            .last
            .as_ref()
            .is_some_and(|last| Arc::ptr_eq(last, &totals) || **last == *totals);
        if unchanged {
            return Ok(None);
        }

        self.last = Some(Arc::clone(&totals));
        Ok(Some(totals))
    }

    /// Polls once and prints the report if it changed.
    pub fn poll_and_print<W: Write>(&mut self, writer: &mut W) -> Result<bool> {
        let Some(totals) = self.poll()? else {
            return Ok(false);
        };
        let report = TotalsReport {
            from: self.date,
            to: self.date,
            worker_names: worker_names(self.db, &totals)?,
            totals,
        };
        writeln!(writer)?;
        write_report(writer, &report)?;
        writer.flush()?;
        Ok(true)
    }
}

/// Runs the watch loop until interrupted.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    cache: &TotalsCache,
    date: NaiveDate,
    interval: Duration,
) -> Result<()> {
    let mut watcher = Watcher::new(db, cache, date);
    loop {
        if !watcher.poll_and_print(writer)? {
            let stats = cache.stats();
            tracing::debug!(hits = stats.hits, misses = stats.misses, "totals unchanged");
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wt_core::ClockEvent;

    fn event(at: &str, kind: &str) -> ClockEvent {
        ClockEvent {
            worker_id: "1".into(),
            worker_name: "Ana".into(),
            timestamp: at.parse().unwrap(),
            event_type: kind.into(),
            task_ref: Some("WO-1".into()),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn prints_only_when_totals_change() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event("2025-03-04T08:00:00", "start"),
            event("2025-03-04T09:00:00", "stop"),
        ])
        .unwrap();
        let cache = TotalsCache::default();

        let mut output = Vec::new();
        {
            let mut watcher = Watcher::new(&db, &cache, day());
            assert!(watcher.poll_and_print(&mut output).unwrap());
            assert!(!watcher.poll_and_print(&mut output).unwrap());
        }
        assert_eq!(cache.stats().hits, 1);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("WORK TIME").count(), 1);
        assert!(text.contains("1h 0m"));
    }

    #[test]
    fn new_events_trigger_reprint() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event("2025-03-04T08:00:00", "start"),
            event("2025-03-04T09:00:00", "stop"),
        ])
        .unwrap();
        let cache = TotalsCache::default();

        let first = Watcher::new(&db, &cache, day()).poll().unwrap();
        assert!(first.is_some());

        db.insert_events(&[
            event("2025-03-04T10:00:00", "start"),
            event("2025-03-04T10:30:00", "stop"),
        ])
        .unwrap();
        let mut watcher = Watcher::new(&db, &cache, day());
        watcher.last = first;
        let second = watcher.poll().unwrap().expect("totals changed");
        assert!((second.total_secs() - 5_400.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inert_events_do_not_trigger_reprint() {
        let mut db = Database::open_in_memory().unwrap();
        db.insert_events(&[
            event("2025-03-04T08:00:00", "start"),
            event("2025-03-04T09:00:00", "stop"),
        ])
        .unwrap();
        let cache = TotalsCache::default();
        let first = Watcher::new(&db, &cache, day()).poll().unwrap();

        db.insert_events(&[event("2025-03-04T09:05:00", "pause")]).unwrap();
        let mut watcher = Watcher::new(&db, &cache, day());
        watcher.last = first;
        assert!(watcher.poll().unwrap().is_none());
        assert_eq!(cache.stats().misses, 2);
    }
}
