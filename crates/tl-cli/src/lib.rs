//! Timelog CLI library.
//!
//! This crate provides the command-line interface over `tl-core`: the
//! filesystem store, configuration, and one module per subcommand.

mod cli;
pub mod commands;
mod config;
pub mod host;
pub mod store;

pub use cli::{Cli, Commands, OutputArgs, PeriodArgs};
pub use config::Config;
