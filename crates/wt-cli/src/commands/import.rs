//! Import command for loading clock events into the local `SQLite` store.

use std::io::BufRead;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;

use wt_core::ClockEvent;
use wt_db::Database;

/// Timestamp layouts accepted on import: ISO 8601 and `SQLite`'s space-separated form.
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Reads JSONL clock events from `reader` and stores them.
pub fn run<R: BufRead>(db: &mut Database, reader: R) -> Result<usize> {
    let events = parse_events(reader)?;
    let inserted = db
        .insert_events(&events)
        .context("failed to store clock events")?;
    tracing::info!(inserted, "imported clock events");
    Ok(inserted)
}

fn parse_events<R: BufRead>(reader: R) -> Result<Vec<ClockEvent>> {
    let mut events = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let event = parsed
            .into_event()
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        if event.action().is_none() {
            tracing::warn!(
                line = idx + 1,
                event_type = %event.event_type,
                "unrecognised event type, stored as inert"
            );
        }
        events.push(event);
    }
    Ok(events)
}

#[derive(Debug, Deserialize)]
struct ImportEvent {
    worker_id: WorkerField,
    #[serde(default)]
    worker_name: Option<String>,
    timestamp: String,
    event_type: String,
    #[serde(default)]
    task_ref: Option<String>,
}

/// Terminals export worker numbers either as strings or as integers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkerField {
    Text(String),
    Number(i64),
}

impl ImportEvent {
    fn into_event(self) -> Result<ClockEvent> {
        let worker_id = match self.worker_id {
            WorkerField::Text(id) => id.trim().to_string(),
            WorkerField::Number(id) => id.to_string(),
        };
        if worker_id.is_empty() {
            return Err(anyhow::anyhow!("missing worker_id"));
        }
        let timestamp = parse_timestamp(self.timestamp.trim())?;
        Ok(ClockEvent {
            worker_id,
            worker_name: self.worker_name.unwrap_or_default(),
            timestamp,
            event_type: self.event_type,
            task_ref: self.task_ref,
        })
    }
}

fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .ok_or_else(|| anyhow::anyhow!("invalid timestamp: {s}"))
}
