//! Local personal-finance ledger: bank CSV ingestion and a SQLite-backed
//! transaction store.

pub mod db;
pub mod import;
pub mod models;

pub use db::{BatchInsertError, StoreError, TransactionStore};
pub use import::{CsvIngestor, ImportError, IngestOptions};
pub use models::{Transaction, TransactionType, TransactionUpdate};
