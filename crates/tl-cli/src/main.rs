use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::util::{group_specs, resolve_period, today};
use tl_cli::commands::{entries, log, report, status, summary};
use tl_cli::host::resolve_host_id;
use tl_cli::store::FsStore;
use tl_cli::{Cli, Commands, Config};
use tl_core::{CsvExporter, DocumentExporter, Query};

/// Load config and build the store over its log directory.
fn open_store(config_path: Option<&Path>) -> Result<(FsStore, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let store = FsStore::new(&config.log_dir, &config.source_pattern);
    Ok((store, config))
}

#[expect(
    clippy::too_many_lines,
    reason = "CLI command dispatch is inherently verbose"
)]
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

    let mut stdout = io::stdout();

    match &cli.command {
        Some(Commands::Log {
            title,
            tags,
            body,
            properties,
            file,
        }) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let host = resolve_host_id(&config)?;
            let destination = file
                .clone()
                .unwrap_or_else(|| config.active_document_path(&host));
            let draft = log::draft(title, tags.as_deref(), body.as_deref(), properties)?;
            log::run(
                &mut stdout,
                &store,
                &destination,
                draft,
                &host,
                Local::now().naive_local(),
            )?;
        }
        Some(Commands::Csv {
            period,
            fields,
            output,
        }) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let query = Query {
                period: resolve_period(period, today())?,
                group_by: group_specs(&output.group_by),
            };
            let fields = if fields.is_empty() {
                &config.csv_fields
            } else {
                fields
            };
            let exporter = CsvExporter::new(fields.iter().map(|f| f.trim().to_ascii_uppercase()));
            report::run(
                &mut stdout,
                &store,
                &query,
                &exporter,
                output.output.as_deref(),
            )?;
        }
        Some(Commands::Export { period, output }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let query = Query {
                period: resolve_period(period, today())?,
                group_by: group_specs(&output.group_by),
            };
            report::run(
                &mut stdout,
                &store,
                &query,
                &DocumentExporter,
                output.output.as_deref(),
            )?;
        }
        Some(Commands::Summary {
            period,
            group_by,
            json,
        }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let query = Query {
                period: resolve_period(period, today())?,
                group_by: group_specs(group_by),
            };
            summary::run(&mut stdout, &store, &query, *json)?;
        }
        Some(Commands::Entries { period, json }) => {
            let (store, _config) = open_store(cli.config.as_deref())?;
            let period = resolve_period(period, today())?;
            entries::run(&mut stdout, &store, period.as_ref(), *json)?;
        }
        Some(Commands::Status) => {
            let (store, config) = open_store(cli.config.as_deref())?;
            let host = resolve_host_id(&config)?;
            status::run(&mut stdout, &store, &config.active_document_path(&host))?;
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
