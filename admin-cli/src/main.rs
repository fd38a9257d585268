use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use admin_cli::commands::{self, ListOptions, TotalsOptions};
use admin_cli::config::AppConfig;
use admin_cli::logging;
use admin_core::EntityKind;
use admin_core::backend::BackendKind;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Back-office administration for a clothing store.
///
/// Reads entity collections from the configured backend, pages and filters
/// them, totals purchase and return documents, and summarises activity.
#[derive(Debug, Parser)]
#[command(name = "admin", version)]
struct Cli {
    /// Settings file. Defaults to `admin.toml` in the working directory
    /// when that file exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory for the JSON backend; overrides the config file.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Backend to use; overrides the config file.
    #[arg(long, global = true, value_parser = parse_backend)]
    backend: Option<BackendKind>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print one page of an entity collection.
    List {
        /// users, roles, permissions, clients, providers, products,
        /// purchases, sales or returns.
        #[arg(value_parser = parse_entity)]
        entity: EntityKind,

        /// Case-insensitive filter over the entity's searchable fields.
        #[arg(long)]
        search: Option<String>,

        /// 1-based page; out-of-range values are clamped.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,

        /// Must be one of the configured page size options.
        #[arg(long)]
        per_page: Option<usize>,
    },

    /// Total a purchase (or return) document and check it for submission.
    Totals {
        /// JSON file `{ "items": [{ "variant_ref": "...", "quantity": 1 }] }`.
        document: PathBuf,

        /// Variant catalog CSV; the backend's variants are used when omitted.
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Treat the document as a return against `--sale`; quantities
        /// are capped at the units that sale sold.
        #[arg(long, requires = "sale")]
        returns: bool,

        /// Id of the sale being returned.
        #[arg(long, requires = "returns")]
        sale: Option<i64>,

        /// Save the validated document to the backend.
        #[arg(long)]
        submit: bool,
    },

    /// Print sales, purchase and return totals and low-stock counts.
    Dashboard,
}

fn parse_entity(s: &str) -> Result<EntityKind, String> {
    s.parse()
}

fn parse_backend(s: &str) -> Result<BackendKind, String> {
    s.parse().map_err(|e: admin_core::BackendError| e.to_string())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::discover(cli.config.as_deref()).context("cannot load settings")?;
    if let Some(dir) = cli.data {
        config.backend.location = dir;
    }
    if let Some(kind) = cli.backend {
        config.backend.name = kind;
    }

    logging::init_logging(&config.log_level);
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::List {
            entity,
            search,
            page,
            per_page,
        } => {
            debug!("opening {} backend", config.backend.name);
            let backend = commands::open_backend(&config).await?;
            let options = ListOptions {
                search,
                page,
                per_page,
            };
            commands::list(&*backend, &config, entity, &options, &mut out).await?;
        }
        Command::Totals {
            document,
            catalog,
            returns,
            sale,
            submit,
        } => {
            let options = TotalsOptions {
                document,
                catalog,
                returns,
                sale,
                submit,
            };
            let backend = if options.needs_backend() {
                debug!("opening {} backend", config.backend.name);
                Some(commands::open_backend(&config).await?)
            } else {
                None
            };
            commands::totals(backend.as_deref(), &config, &options, &mut out).await?;
        }
        Command::Dashboard => {
            debug!("opening {} backend", config.backend.name);
            let backend = commands::open_backend(&config).await?;
            commands::dashboard(&*backend, &config, &mut out).await?;
        }
    }

    out.flush()?;
    Ok(())
}
