/// The only table the store owns. Foreign keys are declared but not enforced,
/// so rows may point at categories or installment series that do not exist
/// (yet) and the referenced tables may be created before or after this one.
pub(crate) const TRANSACTIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id                    INTEGER PRIMARY KEY AUTOINCREMENT,
    date                  TEXT NOT NULL,
    description           TEXT,
    amount                REAL NOT NULL,
    type                  TEXT NOT NULL CHECK(type IN ('Income', 'Expense')),
    original_source       TEXT,
    category_id           INTEGER,
    tags                  TEXT,
    note                  TEXT,
    installment_series_id INTEGER,
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (installment_series_id) REFERENCES installment_series(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);
"#;

/// Tables owned by the rest of the application. The ledger only refers to
/// them by id.
pub(crate) const ANCILLARY_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE,
    parent_id INTEGER REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS installment_series (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    description        TEXT,
    total_installments INTEGER NOT NULL CHECK(total_installments > 0),
    installment_amount REAL NOT NULL,
    start_date         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_profile (
    id       INTEGER PRIMARY KEY CHECK(id = 1),
    name     TEXT NOT NULL DEFAULT '',
    currency TEXT NOT NULL DEFAULT 'BRL'
);

INSERT OR IGNORE INTO user_profile (id) VALUES (1);
"#;

pub(crate) const TRANSACTION_COLUMNS: &str = "id, date, description, amount, type, original_source, \
     category_id, tags, note, installment_series_id";
