//! Storage layer for clock events.
//!
//! Provides persistence for raw clock events using `rusqlite`. This is the
//! event source the accounting pipeline reads its batches from.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are local wall-clock times stored as TEXT (e.g. `2025-03-04T08:15:00`,
//! with a fractional part only when non-zero). Clock terminals report local time,
//! so no timezone is stored. Zero-padded fields keep lexicographic ordering equal
//! to chronological ordering, which the range queries rely on.
//!
//! ## Batch Order
//!
//! Range queries return events in insertion order (`id`), not timestamp order.
//! The accounting pipeline sorts each worker-day itself, and a stable insertion
//! order keeps repeated queries over unchanged data byte-identical, which is
//! what lets the totals cache hit.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;
use wt_core::ClockEvent;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// A stored timestamp could not be parsed.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A date range query was given an end before its start.
    #[error("invalid range: {start} is after {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A worker's most recent display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRecord {
    pub worker_id: String,
    pub worker_name: String,
}

/// Overview of the stored events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub event_count: usize,
    pub worker_count: usize,
    pub first_event_at: Option<NaiveDateTime>,
    pub last_event_at: Option<NaiveDateTime>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            -- Raw clock actions from the terminals
            -- timestamp: local wall clock, e.g. '2025-03-04T08:15:00'
            -- event_type: free-form ('start', 'konec', ...)
            -- task_ref: work order number, NULL when the terminal sent none
            CREATE TABLE IF NOT EXISTS clock_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                worker_id TEXT NOT NULL,
                worker_name TEXT NOT NULL DEFAULT '',
                timestamp TEXT NOT NULL,
                event_type TEXT NOT NULL,
                task_ref TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_clock_events_timestamp ON clock_events(timestamp);
            CREATE INDEX IF NOT EXISTS idx_clock_events_worker ON clock_events(worker_id);
            ",
        )?;
        Ok(())
    }

    /// Inserts a batch of events in one transaction.
    ///
    /// Empty task references are stored as NULL.
    pub fn insert_events(&mut self, events: &[ClockEvent]) -> Result<usize, DbError> {
        if events.is_empty() {
            return Ok(0);
        }
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO clock_events (worker_id, worker_name, timestamp, event_type, task_ref)
                VALUES (?, ?, ?, ?, ?)
                ",
            )?;
            for event in events {
                inserted += stmt.execute(params![
                    event.worker_id,
                    event.worker_name,
                    format_timestamp(event.timestamp),
                    event.event_type,
                    event.task_ref(),
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(inserted, "stored clock events");
        Ok(inserted)
    }

    /// Lists events with `start <= timestamp < end`, in insertion order.
    pub fn events_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<ClockEvent>, DbError> {
        if end < start {
            return Err(DbError::InvalidRange { start, end });
        }
        if end == start {
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(
            "
            SELECT id, worker_id, worker_name, timestamp, event_type, task_ref
            FROM clock_events
            WHERE timestamp >= ? AND timestamp < ?
            ORDER BY id ASC
            ",
        )?;
        let rows = stmt.query_map(
            [format_timestamp(start), format_timestamp(end)],
            |row| {
                Ok(RawEventRow {
                    id: row.get(0)?,
                    worker_id: row.get(1)?,
                    worker_name: row.get(2)?,
                    timestamp: row.get(3)?,
                    event_type: row.get(4)?,
                    task_ref: row.get(5)?,
                })
            },
        )?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }

    /// Lists events for the calendar days `from..=to`.
    pub fn events_for_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ClockEvent>, DbError> {
        let start = from.and_time(NaiveTime::MIN);
        // `to` is never the last representable date in practice.
        let end = to.succ_opt().unwrap_or(to).and_time(NaiveTime::MIN);
        self.events_between(start, end)
    }

    /// Lists events for one calendar day.
    pub fn events_on(&self, date: NaiveDate) -> Result<Vec<ClockEvent>, DbError> {
        self.events_for_days(date, date)
    }

    /// Lists each worker with the name from their most recent event.
    pub fn workers(&self) -> Result<Vec<WorkerRecord>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT e.worker_id, e.worker_name
            FROM clock_events e
            WHERE e.id = (
                SELECT MAX(latest.id) FROM clock_events latest
                WHERE latest.worker_id = e.worker_id
            )
            ORDER BY e.worker_id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WorkerRecord {
                worker_id: row.get(0)?,
                worker_name: row.get(1)?,
            })
        })?;
        let mut workers = Vec::new();
        for row in rows {
            workers.push(row?);
        }
        Ok(workers)
    }

    /// Summarizes the stored events.
    pub fn summary(&self) -> Result<StoreSummary, DbError> {
        let (event_count, worker_count, first, last) = self.conn.query_row(
            "
            SELECT
                COUNT(*),
                COUNT(DISTINCT worker_id),
                (SELECT id FROM clock_events ORDER BY timestamp ASC, id ASC LIMIT 1),
                MIN(timestamp),
                (SELECT id FROM clock_events ORDER BY timestamp DESC, id DESC LIMIT 1),
                MAX(timestamp)
            FROM clock_events
            ",
            [],
            |row| {
                // (id, timestamp) of the earliest or latest event, if any
                let bound = |id_col: usize, ts_col: usize| -> rusqlite::Result<_> {
                    let id: Option<i64> = row.get(id_col)?;
                    let ts: Option<String> = row.get(ts_col)?;
                    Ok(id.zip(ts))
                };
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    bound(2, 3)?,
                    bound(4, 5)?,
                ))
            },
        )?;

        Ok(StoreSummary {
            event_count: usize::try_from(event_count).unwrap_or_default(),
            worker_count: usize::try_from(worker_count).unwrap_or_default(),
            first_event_at: first.map(|(id, ts)| parse_timestamp(id, ts)).transpose()?,
            last_event_at: last.map(|(id, ts)| parse_timestamp(id, ts)).transpose()?,
        })
    }

    /// Returns the timestamp of the most recently inserted event, if any.
    pub fn last_inserted_at(&self) -> Result<Option<NaiveDateTime>, DbError> {
        let row: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, timestamp FROM clock_events ORDER BY id DESC LIMIT 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        row.map(|(id, ts)| parse_timestamp(id, ts)).transpose()
    }
}

/// Row as stored, before timestamp parsing.
struct RawEventRow {
    id: i64,
    worker_id: String,
    worker_name: String,
    timestamp: String,
    event_type: String,
    task_ref: Option<String>,
}

impl RawEventRow {
    fn into_event(self) -> Result<ClockEvent, DbError> {
        Ok(ClockEvent {
            timestamp: parse_timestamp(self.id, self.timestamp)?,
            worker_id: self.worker_id,
            worker_name: self.worker_name,
            event_type: self.event_type,
            task_ref: self.task_ref,
        })
    }
}

fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(event_id: i64, timestamp: String) -> Result<NaiveDateTime, DbError> {
    NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT).map_err(|source| {
        DbError::TimestampParse {
            event_id,
            timestamp,
            source,
        }
    })
}
