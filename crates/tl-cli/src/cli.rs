//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Append-only activity log.
///
/// Every `tl log` appends an entry to this machine's log file. Reports merge
/// the logs of all machines and treat each entry as lasting until the next.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
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
    /// Append a new entry to the active log document.
    Log {
        /// What you are doing now.
        title: String,

        /// Tags, separated by spaces, commas or colons.
        #[arg(short, long)]
        tags: Option<String>,

        /// Free text stored under the entry.
        #[arg(short, long)]
        body: Option<String>,

        /// Extra property as KEY=VALUE (repeatable).
        #[arg(short = 's', long = "set", value_name = "KEY=VALUE")]
        properties: Vec<String>,

        /// Append to this document instead of the active one.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Write a CSV report of entry fields.
    Csv {
        #[command(flatten)]
        period: PeriodArgs,

        /// Comma-separated field names (e.g. TIMESTAMP,DURATION,TITLE).
        #[arg(short, long, value_delimiter = ',')]
        fields: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write the merged timeline as a single log document.
    Export {
        #[command(flatten)]
        period: PeriodArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show total time per group.
    Summary {
        #[command(flatten)]
        period: PeriodArgs,

        /// Group by `tag`, `day`, or a property name (repeatable).
        #[arg(short, long = "group-by", value_name = "KEY")]
        group_by: Vec<String>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the reconstructed timeline.
    Entries {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON lines.
        #[arg(long)]
        json: bool,
    },

    /// Show log location and contents at a glance.
    Status,
}

/// Period selection shared by reporting commands.
#[derive(Debug, Clone, Default, Args)]
pub struct PeriodArgs {
    /// First day to include (YYYY-MM-DD, today, yesterday, "N days ago").
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Last day to include (same formats as --from).
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Named period: today, yesterday, week, last-week, month, last-month.
    #[arg(short, long, value_name = "NAME", conflicts_with_all = ["from", "to"])]
    pub period: Option<String>,
}

/// Report destination and grouping shared by export commands.
#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Group by `tag`, `day`, or a property name (repeatable).
    #[arg(short, long = "group-by", value_name = "KEY")]
    pub group_by: Vec<String>,

    /// Write the report to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
