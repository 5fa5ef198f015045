//! Status command for showing what the event store holds.

use std::io::Write;

use anyhow::{Context, Result};

use wt_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, db: &Database, config: &Config) -> Result<()> {
    let summary = db.summary().context("failed to summarize clock events")?;

    writeln!(writer, "Work time status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;

    if summary.event_count == 0 {
        writeln!(writer, "No events recorded.")?;
        return Ok(());
    }

    writeln!(writer, "Events:  {}", summary.event_count)?;
    writeln!(writer, "Workers: {}", summary.worker_count)?;
    if let (Some(first), Some(last)) = (summary.first_event_at, summary.last_event_at) {
        writeln!(writer, "Range:   {first} .. {last}")?;
    }

    Ok(())
}
