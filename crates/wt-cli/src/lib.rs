//! Work-time accounting CLI library.
//!
//! This crate provides the CLI interface for the work-time engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, DateRangeArgs};
pub use config::Config;
