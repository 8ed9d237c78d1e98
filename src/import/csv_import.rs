use chrono::NaiveDate;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

use super::columns::{AmountSource, CanonicalField, ColumnMap};
use super::detect;
use super::ImportError;
use crate::models::{Transaction, CSV_SOURCE_TAG};

/// Knobs for [`CsvIngestor`]. The defaults suit Brazilian and US bank exports.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Tried in order against the header line; comma when none appears.
    pub delimiters: Vec<u8>,
    /// Tried in order when the detected encoding cannot decode the header.
    pub fallback_encodings: Vec<&'static Encoding>,
    /// Skip statistical detection and start from this encoding.
    pub assumed_encoding: Option<&'static Encoding>,
    /// Stored as `original_source` on every ingested transaction.
    pub source_tag: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiters: vec![b';', b':', b'\t'],
            fallback_encodings: vec![WINDOWS_1252, UTF_8],
            assumed_encoding: None,
            source_tag: CSV_SOURCE_TAG.to_string(),
        }
    }
}

/// One normalized row: the `date, description, amount` projection of a
/// bank export line.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    /// Line in the source file, for error messages.
    pub line: u64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub amount: Decimal,
}

/// A fully normalized file along with what was detected about it.
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub encoding: &'static Encoding,
    pub delimiter: u8,
    pub rows: Vec<CanonicalRow>,
}

/// Outcome of ingesting one file in a batch.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Result<Vec<Transaction>, ImportError>,
}

#[derive(Debug, Clone, Default)]
pub struct CsvIngestor {
    options: IngestOptions,
}

impl CsvIngestor {
    pub fn new(options: IngestOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Decode, parse and normalize a bank export. All-or-nothing: any bad
    /// line fails the whole file.
    pub fn normalize(&self, file: &str, bytes: &[u8]) -> Result<ParsedCsv, ImportError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(ImportError::EmptyInput { file: file.into() });
        }

        let (encoding, bom_len) = detect::detect_encoding(
            bytes,
            self.options.assumed_encoding,
            &self.options.fallback_encodings,
        )
        .ok_or_else(|| ImportError::Encoding {
            file: file.into(),
            reason: "no candidate encoding could decode the header line".into(),
        })?;

        let text = encoding
            .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
            .ok_or_else(|| ImportError::Encoding {
                file: file.into(),
                reason: format!("invalid {} byte sequence", encoding.name()),
            })?;

        if text.trim().is_empty() {
            return Err(ImportError::EmptyInput { file: file.into() });
        }

        let delimiter = detect::detect_delimiter(detect::first_line(&text), &self.options.delimiters);
        let rows = parse_rows(file, &text, delimiter)?;

        info!(
            file,
            encoding = encoding.name(),
            delimiter = %char::from(delimiter).escape_default(),
            rows = rows.len(),
            "parsed CSV"
        );
        Ok(ParsedCsv {
            encoding,
            delimiter,
            rows,
        })
    }

    /// The first `limit` normalized rows, for showing before anything is stored.
    pub fn preview(
        &self,
        file: &str,
        bytes: &[u8],
        limit: usize,
    ) -> Result<Vec<CanonicalRow>, ImportError> {
        let mut parsed = self.normalize(file, bytes)?;
        parsed.rows.truncate(limit);
        Ok(parsed.rows)
    }

    /// Normalize a file and build transactions ready for insertion. Rows with
    /// a zero amount carry no information and are skipped.
    pub fn ingest(&self, file: &str, bytes: &[u8]) -> Result<Vec<Transaction>, ImportError> {
        let parsed = self.normalize(file, bytes)?;
        let mut transactions = Vec::with_capacity(parsed.rows.len());

        for row in parsed.rows {
            if row.amount.is_zero() {
                warn!(file, line = row.line, "skipping row with zero amount");
                continue;
            }
            let amount = row.amount.to_f64().ok_or_else(|| ImportError::InvalidAmount {
                file: file.into(),
                line: row.line,
                column: CanonicalField::Amount.as_str(),
                value: row.amount.to_string(),
            })?;

            transactions.push(Transaction::from_csv(
                row.date,
                row.description,
                amount,
                &self.options.source_tag,
            ));
        }

        Ok(transactions)
    }

    pub fn ingest_path(&self, path: &Path) -> Result<Vec<Transaction>, ImportError> {
        let file = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ImportError::FileNotFound { file: file.clone() },
            _ => ImportError::Io {
                file: file.clone(),
                source,
            },
        })?;
        self.ingest(&file, &bytes)
    }

    /// Ingest each file independently; one bad file does not stop the others.
    pub fn ingest_files(&self, paths: &[PathBuf]) -> Vec<FileReport> {
        paths
            .iter()
            .map(|path| {
                let outcome = self.ingest_path(path);
                if let Err(e) = &outcome {
                    warn!(error = %e, "failed to ingest file");
                }
                FileReport {
                    path: path.clone(),
                    outcome,
                }
            })
            .collect()
    }
}

fn parse_rows(file: &str, text: &str, delimiter: u8) -> Result<Vec<CanonicalRow>, ImportError> {
    let parse_error = |e: csv::Error| ImportError::Parse {
        file: file.into(),
        line: e.position().map(|p| p.line()).unwrap_or(0),
        message: e.to_string(),
    };

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr.headers().map_err(parse_error)?.clone();
    let columns = ColumnMap::from_headers(headers.iter());
    debug!(file, ?columns, "mapped columns");

    let mut records = Vec::new();
    for result in rdr.records() {
        records.push(result.map_err(parse_error)?);
    }
    if records.is_empty() {
        return Err(ImportError::EmptyInput { file: file.into() });
    }

    let date_col = columns.date.ok_or_else(|| ImportError::MissingColumn {
        file: file.into(),
        column: CanonicalField::Date.as_str(),
    })?;
    let amount_source = columns
        .amount_source()
        .ok_or_else(|| ImportError::NoAmountColumn { file: file.into() })?;

    let mut rows = Vec::with_capacity(records.len());
    for record in &records {
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let date_str = record.get(date_col).unwrap_or_default();
        if date_str.is_empty() {
            warn!(file, line, "skipping row without a date");
            continue;
        }
        let date = parse_date(date_str).ok_or_else(|| ImportError::InvalidDate {
            file: file.into(),
            line,
            value: date_str.into(),
        })?;

        let description = columns
            .description
            .and_then(|c| record.get(c))
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let cell = |col: usize, field: CanonicalField| -> Result<Decimal, ImportError> {
            let raw = record.get(col).unwrap_or_default();
            parse_decimal(raw).ok_or_else(|| ImportError::InvalidAmount {
                file: file.into(),
                line,
                column: field.as_str(),
                value: raw.into(),
            })
        };

        let amount = match amount_source {
            AmountSource::IncomeMinusExpense { income, expense } => {
                let income = cell(income, CanonicalField::Income)?;
                let expense = cell(expense, CanonicalField::Expense)?;
                income
                    .checked_sub(expense)
                    .ok_or_else(|| ImportError::InvalidAmount {
                        file: file.into(),
                        line,
                        column: CanonicalField::Amount.as_str(),
                        value: format!("{income} - {expense}"),
                    })?
            }
            AmountSource::Income(income) => cell(income, CanonicalField::Income)?,
            AmountSource::NegatedExpense(expense) => -cell(expense, CanonicalField::Expense)?,
            AmountSource::Direct(amount) => cell(amount, CanonicalField::Amount)?,
        };

        rows.push(CanonicalRow {
            line,
            date,
            description,
            amount,
        });
    }

    Ok(rows)
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%m/%d/%Y",
];

/// Day-first formats are tried before month-first ones. A trailing time of
/// day is ignored.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Parse a money cell written in either `1.234,56` or `1,234.56` style,
/// with optional currency symbol, parentheses or trailing minus for
/// negatives. A blank cell is zero.
fn parse_decimal(s: &str) -> Option<Decimal> {
    let mut cleaned = s
        .trim()
        .replace("R$", "")
        .replace(['$', '€', '£', '"', ' ', '\u{a0}'], "");
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }

    let mut negative = false;
    if let Some(inner) = cleaned.strip_prefix('(').and_then(|c| c.strip_suffix(')')) {
        negative = true;
        cleaned = inner.to_string();
    }
    if let Some(inner) = cleaned.strip_suffix('-') {
        negative = !negative;
        cleaned = inner.to_string();
    }

    let value = Decimal::from_str(&normalize_separators(&cleaned)).ok()?;
    Some(if negative { -value } else { value })
}

fn normalize_separators(s: &str) -> String {
    match (s.rfind(','), s.rfind('.')) {
        // 1.234,56
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        // 1,234.56
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(comma), None) => {
            if is_decimal_mark(s, comma, ',') {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(dot)) if !is_decimal_mark(s, dot, '.') => s.replace('.', ""),
        _ => s.to_string(),
    }
}

/// A lone separator followed by exactly three digits groups thousands,
/// whichever character it is: `1.500` and `1,500` are both fifteen hundred.
fn is_decimal_mark(s: &str, pos: usize, sep: char) -> bool {
    s.matches(sep).count() == 1 && s.len() - pos - 1 != 3
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
