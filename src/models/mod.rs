mod transaction;

pub use transaction::{Transaction, TransactionType, TransactionUpdate, CSV_SOURCE_TAG};
