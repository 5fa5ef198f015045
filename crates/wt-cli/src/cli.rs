//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Work-time accounting for workshop clock terminals.
///
/// Turns start/stop clock events into per-task and per-worker work time,
/// deducting unlogged statutory breaks.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import clock events as JSONL from stdin.
    Import,

    /// Show work time per task and per worker.
    Totals {
        #[command(flatten)]
        range: DateRangeArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show per worker-day figures: raw time, lunch gap, deduction.
    Days {
        #[command(flatten)]
        range: DateRangeArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Poll the store and reprint totals whenever they change.
    Watch {
        /// Day to watch (YYYY-MM-DD, today, yesterday, or "N days ago").
        #[arg(long)]
        date: Option<String>,

        /// Seconds between polls.
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },

    /// Show database location and stored event counts.
    Status,
}

/// Day selection shared by reporting commands.
#[derive(Debug, Clone, Default, Args)]
pub struct DateRangeArgs {
    /// Single day (YYYY-MM-DD, today, yesterday, or "N days ago"). Default: today.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<String>,

    /// First day of a range (inclusive).
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last day of a range (inclusive).
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}
