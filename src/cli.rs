use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use finledger::db::TransactionStore;
use finledger::import::{CsvIngestor, IngestOptions};
use finledger::models::{Transaction, TransactionType, TransactionUpdate};

const PREVIEW_ROWS: usize = 5;

#[derive(Parser)]
#[command(
    name = "finledger",
    version,
    about = "Local-only personal finance ledger with bank CSV import."
)]
pub(crate) struct Cli {
    /// Database file (default: platform data directory)
    #[arg(long, global = true, env = "FINLEDGER_DB")]
    pub(crate) db: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create the database and print where it lives.
    Init,
    /// Import one or more bank CSV exports.
    Import {
        /// CSV files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Show what would be imported without storing anything
        #[arg(long)]
        dry_run: bool,
        /// Provenance tag stored on imported rows
        #[arg(long, default_value = finledger::models::CSV_SOURCE_TAG)]
        source: String,
    },
    /// List all transactions.
    List,
    /// Show one transaction.
    Show { id: i64 },
    /// Record a transaction by hand. Negative amounts are expenses.
    Add {
        /// Date as YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Change some fields of a transaction.
    Update {
        id: i64,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<f64>,
        #[command(flatten)]
        fields: FieldArgs,
        /// Clear a field: description, source, category, tags, note, installment-series
        #[arg(long, value_delimiter = ',')]
        clear: Vec<String>,
    },
    /// Delete a transaction.
    Delete { id: i64 },
}

#[derive(Args)]
pub(crate) struct FieldArgs {
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<i64>,
    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,
    #[arg(long)]
    note: Option<String>,
    #[arg(long)]
    installment_series: Option<i64>,
}

pub(crate) fn run(command: Commands, store: &mut TransactionStore, db_path: &Path) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Database ready at {}", db_path.display());
            println!("{} transactions stored", store.count()?);
            Ok(())
        }
        Commands::Import {
            files,
            dry_run,
            source,
        } => cli_import(&files, dry_run, source, store),
        Commands::List => cli_list(store),
        Commands::Show { id } => cli_show(id, store),
        Commands::Add {
            date,
            amount,
            fields,
        } => cli_add(date, amount, fields, store),
        Commands::Update {
            id,
            date,
            amount,
            fields,
            clear,
        } => cli_update(id, date, amount, fields, &clear, store),
        Commands::Delete { id } => {
            if store.delete(id)? {
                println!("Deleted transaction {id}");
            } else {
                println!("No transaction with id {id}");
            }
            Ok(())
        }
    }
}

fn cli_import(
    files: &[PathBuf],
    dry_run: bool,
    source: String,
    store: &mut TransactionStore,
) -> Result<()> {
    let ingestor = CsvIngestor::new(IngestOptions {
        source_tag: source,
        ..IngestOptions::default()
    });

    let mut failed = 0;
    for report in ingestor.ingest_files(files) {
        let txns = match report.outcome {
            Ok(txns) => txns,
            Err(e) => {
                eprintln!("Error: {e}");
                failed += 1;
                continue;
            }
        };

        println!("Preview of {}:", report.path.display());
        print_table(txns.iter().take(PREVIEW_ROWS));
        if txns.len() > PREVIEW_ROWS {
            println!("  ... {} more", txns.len() - PREVIEW_ROWS);
        }

        if dry_run {
            println!("Parsed {} transactions (dry run, nothing stored)", txns.len());
            continue;
        }

        match store.insert_all(&txns) {
            Ok(ids) => println!("Imported {} transactions", ids.len()),
            Err(e) => {
                eprintln!("Error: {}: {e}", report.path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files could not be imported", files.len());
    }
    Ok(())
}

fn cli_list(store: &TransactionStore) -> Result<()> {
    let txns = store.get_all()?;
    if txns.is_empty() {
        println!("No transactions");
        return Ok(());
    }
    print_table(txns.iter());
    Ok(())
}

fn cli_show(id: i64, store: &TransactionStore) -> Result<()> {
    let txn = store
        .get_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("No transaction with id {id}"))?;

    println!("ID:                 {id}");
    println!("Date:               {}", txn.date);
    println!("Description:        {}", txn.description.as_deref().unwrap_or(""));
    println!("Amount:             {:.2}", txn.amount);
    println!("Type:               {}", txn.kind);
    println!("Source:             {}", txn.original_source.as_deref().unwrap_or(""));
    println!("Category:           {}", optional_id(txn.category_id));
    println!("Tags:               {}", txn.tag_list().join(", "));
    println!("Note:               {}", txn.note.as_deref().unwrap_or(""));
    println!("Installment series: {}", optional_id(txn.installment_series_id));
    Ok(())
}

fn cli_add(
    date: NaiveDate,
    amount: f64,
    fields: FieldArgs,
    store: &mut TransactionStore,
) -> Result<()> {
    let mut txn = Transaction::new(date, fields.description, amount);
    txn.original_source = Some("manual".into());
    txn.category_id = fields.category;
    txn.tags = fields.tags;
    txn.note = fields.note;
    txn.installment_series_id = fields.installment_series;

    let id = store.insert(&txn).context("Failed to add transaction")?;
    println!("Added {} transaction {id}", txn.kind);
    Ok(())
}

fn cli_update(
    id: i64,
    date: Option<NaiveDate>,
    amount: Option<f64>,
    fields: FieldArgs,
    clear: &[String],
    store: &mut TransactionStore,
) -> Result<()> {
    let mut changes = TransactionUpdate {
        date,
        amount,
        description: fields.description.map(Some),
        category_id: fields.category.map(Some),
        tags: fields.tags.map(Some),
        note: fields.note.map(Some),
        installment_series_id: fields.installment_series.map(Some),
        ..TransactionUpdate::default()
    };

    for field in clear {
        match field.trim() {
            "description" => changes.description = Some(None),
            "source" => changes.original_source = Some(None),
            "category" => changes.category_id = Some(None),
            "tags" => changes.tags = Some(None),
            "note" => changes.note = Some(None),
            "installment-series" => changes.installment_series_id = Some(None),
            other => anyhow::bail!("Cannot clear unknown field: {other}"),
        }
    }

    if changes.is_empty() {
        println!("Nothing to update");
        return Ok(());
    }
    if store.update(id, &changes)? {
        println!("Updated transaction {id}");
    } else {
        println!("No transaction with id {id}");
    }
    Ok(())
}

fn print_table<'a>(txns: impl Iterator<Item = &'a Transaction>) {
    println!(
        "{:<6} {:<10} {:>12} {:<8} Description",
        "ID", "Date", "Amount", "Type"
    );
    println!("{}", "─".repeat(60));
    for txn in txns {
        let marker = match txn.kind {
            TransactionType::Income => "+",
            TransactionType::Expense => "-",
        };
        println!(
            "{:<6} {:<10} {:>12.2} {:<8} {}",
            optional_id(txn.id),
            txn.date,
            txn.amount,
            format!("{marker}{}", txn.kind),
            txn.description.as_deref().unwrap_or(""),
        );
    }
}

fn optional_id(id: Option<i64>) -> String {
    id.map(|i| i.to_string()).unwrap_or_default()
}
