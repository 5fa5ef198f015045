//! CLI subcommand implementations.

pub mod days;
pub mod import;
pub mod status;
pub mod totals;
pub mod util;
pub mod watch;
