mod error;
mod schema;

use chrono::NaiveDate;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use tracing::debug;

use crate::models::{Transaction, TransactionType, TransactionUpdate};

pub use error::{BatchInsertError, StoreError};

const DATE_FORMAT: &str = "%Y-%m-%d";

fn bootstrap_ancillary_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(schema::ANCILLARY_TABLES)?;
    Ok(())
}

/// CRUD over the `transactions` table.
///
/// The store owns its connection and is handed to callers explicitly; it is
/// not meant to be shared between threads.
pub struct TransactionStore {
    conn: Connection,
}

impl TransactionStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::connection(path, e))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| StoreError::connection(path, e))?;
        let store = Self::from_connection(conn).map_err(|e| StoreError::connection(path, e))?;
        debug!(path = %path.display(), "opened transaction store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::connection(Path::new(":memory:"), e))?;
        Self::from_connection(conn)
    }

    /// Wrap an already opened connection, creating the table if needed.
    /// Category and installment-series ids are weak references, so foreign
    /// key enforcement is switched off for this connection.
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=OFF;")?;
        let store = Self { conn };
        store.ensure_schema()?;
        Ok(store)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the tables the ledger only references by id (categories,
    /// installment series, the single-row user profile). Safe to run
    /// repeatedly and before or after [`Self::ensure_schema`].
    pub fn bootstrap_ancillary_schema(&self) -> Result<(), StoreError> {
        bootstrap_ancillary_schema(&self.conn)
    }

    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(schema::TRANSACTIONS_TABLE)?;
        Ok(())
    }

    /// Persist a new transaction and return its id.
    pub fn insert(&mut self, txn: &Transaction) -> Result<i64, StoreError> {
        if let Some(id) = txn.id {
            return Err(StoreError::ConstraintViolation(format!(
                "transaction already has id {id}"
            )));
        }
        validate_amount(txn.amount, txn.kind)?;

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO transactions (date, description, amount, type, original_source, category_id, tags, note, installment_series_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                txn.date.format(DATE_FORMAT).to_string(),
                txn.description,
                txn.amount,
                txn.kind.as_str(),
                txn.original_source,
                txn.category_id,
                txn.tags,
                txn.note,
                txn.installment_series_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!(id, amount = txn.amount, "inserted transaction");
        Ok(id)
    }

    /// Insert rows one at a time, in order. Each row is its own atomic write;
    /// the first failure stops the loop.
    pub fn insert_all(&mut self, txns: &[Transaction]) -> Result<Vec<i64>, BatchInsertError> {
        let mut stored = Vec::with_capacity(txns.len());
        for txn in txns {
            match self.insert(txn) {
                Ok(id) => stored.push(id),
                Err(source) => {
                    return Err(BatchInsertError {
                        stored,
                        total: txns.len(),
                        source,
                    })
                }
            }
        }
        Ok(stored)
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {} FROM transactions WHERE id = ?1",
            schema::TRANSACTION_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![id], Transaction::from_row)
            .optional()?)
    }

    /// Every row, oldest id first.
    pub fn get_all(&self) -> Result<Vec<Transaction>, StoreError> {
        let sql = format!(
            "SELECT {} FROM transactions ORDER BY id",
            schema::TRANSACTION_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], Transaction::from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    /// Apply `changes` to row `id`. Returns whether a row was modified; an
    /// empty change set never touches the database.
    ///
    /// Changing the amount without a type re-derives the type from the new
    /// sign. An explicit type must agree with the resulting amount.
    pub fn update(&mut self, id: i64, changes: &TransactionUpdate) -> Result<bool, StoreError> {
        if changes.is_empty() {
            return Ok(false);
        }

        let tx = self.conn.transaction()?;
        let current: Option<f64> = tx
            .query_row(
                "SELECT amount FROM transactions WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current_amount) = current else {
            return Ok(false);
        };

        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(date) = changes.date {
            sets.push("date");
            values.push(Box::new(date.format(DATE_FORMAT).to_string()));
        }
        if let Some(description) = &changes.description {
            sets.push("description");
            values.push(Box::new(description.clone()));
        }
        if changes.amount.is_some() || changes.kind.is_some() {
            let amount = changes.amount.unwrap_or(current_amount);
            let kind = changes
                .kind
                .unwrap_or_else(|| TransactionType::from_amount(amount));
            validate_amount(amount, kind)?;
            sets.push("amount");
            values.push(Box::new(amount));
            sets.push("type");
            values.push(Box::new(kind.as_str()));
        }
        if let Some(source) = &changes.original_source {
            sets.push("original_source");
            values.push(Box::new(source.clone()));
        }
        if let Some(category_id) = changes.category_id {
            sets.push("category_id");
            values.push(Box::new(category_id));
        }
        if let Some(tags) = &changes.tags {
            sets.push("tags");
            values.push(Box::new(tags.clone()));
        }
        if let Some(note) = &changes.note {
            sets.push("note");
            values.push(Box::new(note.clone()));
        }
        if let Some(series_id) = changes.installment_series_id {
            sets.push("installment_series_id");
            values.push(Box::new(series_id));
        }

        let assignments = sets
            .iter()
            .enumerate()
            .map(|(i, col)| format!("{col} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE transactions SET {assignments} WHERE id = ?{}",
            values.len() + 1
        );
        values.push(Box::new(id));

        let params_ref: Vec<&dyn ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let changed = tx.execute(&sql, params_ref.as_slice())?;
        tx.commit()?;

        debug!(id, fields = ?sets, "updated transaction");
        Ok(changed > 0)
    }

    /// Remove row `id`. Deleting a missing id is not an error.
    pub fn delete(&mut self, id: i64) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
        debug!(id, removed, "deleted transaction");
        Ok(removed > 0)
    }
}

/// Amount must be finite and non-zero, and its sign must match `kind`.
fn validate_amount(amount: f64, kind: TransactionType) -> Result<(), StoreError> {
    if !amount.is_finite() {
        return Err(StoreError::ConstraintViolation(format!(
            "amount must be finite, got {amount}"
        )));
    }
    if amount == 0.0 {
        return Err(StoreError::ConstraintViolation(
            "amount must be non-zero".to_string(),
        ));
    }
    let expected = TransactionType::from_amount(amount);
    if kind != expected {
        return Err(StoreError::ConstraintViolation(format!(
            "type {kind} does not match amount {amount} (expected {expected})"
        )));
    }
    Ok(())
}

impl Transaction {
    /// Build a transaction from a row selected with `TRANSACTION_COLUMNS`.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let date_str: String = row.get(1)?;
        let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
        let kind_str: String = row.get(4)?;
        let kind = TransactionType::parse(&kind_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("unknown transaction type '{kind_str}'").into(),
            )
        })?;

        Ok(Self {
            id: Some(row.get(0)?),
            date,
            description: row.get(2)?,
            amount: row.get(3)?,
            kind,
            original_source: row.get(5)?,
            category_id: row.get(6)?,
            tags: row.get(7)?,
            note: row.get(8)?,
            installment_series_id: row.get(9)?,
        })
    }
}
