//! CLI subcommand implementations.

pub mod entries;
pub mod log;
pub mod report;
pub mod status;
pub mod summary;
pub mod util;
