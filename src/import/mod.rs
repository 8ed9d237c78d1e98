mod columns;
mod csv_import;
mod detect;
mod error;

pub use columns::CanonicalField;
pub use csv_import::{CanonicalRow, CsvIngestor, FileReport, IngestOptions, ParsedCsv};
pub use error::ImportError;
