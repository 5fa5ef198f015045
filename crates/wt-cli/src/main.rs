use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::{days, import, status, totals, util, watch};
use wt_cli::{Cli, Commands, Config};
use wt_core::TotalsCache;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(wt_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wt_db::Database::open(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let today = Local::now().date_naive();
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Import) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            let inserted = import::run(&mut db, io::stdin().lock())?;
            println!("Imported {inserted} events");
        }
        Some(Commands::Totals { range, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let (from, to) = util::resolve_range(range, today)?;
            let cache = TotalsCache::new(config.policy, config.cache_capacity);
            totals::run(&mut stdout, &db, &cache, from, to, *json)?;
        }
        Some(Commands::Days { range, json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let (from, to) = util::resolve_range(range, today)?;
            days::run(&mut stdout, &db, &config.policy, from, to, *json)?;
        }
        Some(Commands::Watch { date, interval }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let date = match date {
                Some(date) => util::parse_date(date, today).context("invalid --date")?,
                None => today,
            };
            let cache = TotalsCache::new(config.policy, config.cache_capacity);
            watch::run(
                &mut stdout,
                &db,
                &cache,
                date,
                Duration::from_secs((*interval).max(1)),
            )?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
