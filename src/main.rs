mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use finledger::db::TransactionStore;

fn main() -> Result<()> {
    let args = cli::Cli::parse();
    init_logging();

    let db_path = match args.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    let mut store = TransactionStore::open(&db_path)?;
    store
        .bootstrap_ancillary_schema()
        .context("Failed to create supporting tables")?;

    cli::run(args.command, &mut store, &db_path)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn default_db_path() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "finledger", "Finledger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join("finance.db"))
}
