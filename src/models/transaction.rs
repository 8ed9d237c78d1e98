use chrono::NaiveDate;

/// Provenance tag stamped on every row produced by CSV ingestion.
pub const CSV_SOURCE_TAG: &str = "CSV FILE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Strict counterpart of [`TransactionType::as_str`]. Anything outside the
    /// two stored spellings is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Income" => Some(Self::Income),
            "Expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Income for strictly positive amounts, Expense otherwise.
    pub fn from_amount(amount: f64) -> Self {
        if amount > 0.0 {
            Self::Income
        } else {
            Self::Expense
        }
    }

    pub fn all() -> &'static [TransactionType] {
        &[Self::Income, Self::Expense]
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ledger row.
///
/// The signed `amount` is the source of truth: positive is money in, negative
/// is money out. `kind` mirrors the sign and is checked against it by the
/// store on every write.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub amount: f64,
    pub kind: TransactionType,
    pub original_source: Option<String>,
    pub category_id: Option<i64>,
    pub tags: Option<String>,
    pub note: Option<String>,
    pub installment_series_id: Option<i64>,
}

impl Transaction {
    /// A manual entry with the type derived from the sign of `amount`.
    pub fn new(date: NaiveDate, description: Option<String>, amount: f64) -> Self {
        Self {
            id: None,
            date,
            description,
            amount,
            kind: TransactionType::from_amount(amount),
            original_source: None,
            category_id: None,
            tags: None,
            note: None,
            installment_series_id: None,
        }
    }

    /// A row produced by CSV ingestion. `source` is usually [`CSV_SOURCE_TAG`].
    pub fn from_csv(
        date: NaiveDate,
        description: Option<String>,
        amount: f64,
        source: &str,
    ) -> Self {
        Self {
            original_source: Some(source.to_string()),
            ..Self::new(date, description, amount)
        }
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    pub fn abs_amount(&self) -> f64 {
        self.amount.abs()
    }

    /// Split the comma-separated `tags` field into trimmed, non-empty entries.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A sparse set of changes for [`crate::db::TransactionStore::update`].
///
/// Only the mutable columns are representable. For nullable columns the outer
/// `Option` says whether the field is being changed and the inner one carries
/// the new value, so `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub date: Option<NaiveDate>,
    pub description: Option<Option<String>>,
    pub amount: Option<f64>,
    pub kind: Option<TransactionType>,
    pub original_source: Option<Option<String>>,
    pub category_id: Option<Option<i64>>,
    pub tags: Option<Option<String>>,
    pub note: Option<Option<String>>,
    pub installment_series_id: Option<Option<i64>>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::default()
        }
    }
}
