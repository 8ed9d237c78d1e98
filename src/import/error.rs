use thiserror::Error;

/// Why a file could not be turned into transactions. Every variant names the
/// file so the message can be shown as is.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("The file {file} was not found")]
    FileNotFound { file: String },

    #[error("Could not read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The file {file} is empty")]
    EmptyInput { file: String },

    #[error("Error decoding file {file}: {reason}")]
    Encoding { file: String, reason: String },

    #[error("Problem parsing file {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: u64,
        message: String,
    },

    #[error("No {column} column found in {file}")]
    MissingColumn { file: String, column: &'static str },

    #[error("No income, expense or amount column found in {file}")]
    NoAmountColumn { file: String },

    #[error("{file}, line {line}: could not parse date '{value}'")]
    InvalidDate {
        file: String,
        line: u64,
        value: String,
    },

    #[error("{file}, line {line}: could not parse {column} '{value}'")]
    InvalidAmount {
        file: String,
        line: u64,
        column: &'static str,
        value: String,
    },
}

impl ImportError {
    pub fn file(&self) -> &str {
        match self {
            Self::FileNotFound { file }
            | Self::Io { file, .. }
            | Self::EmptyInput { file }
            | Self::Encoding { file, .. }
            | Self::Parse { file, .. }
            | Self::MissingColumn { file, .. }
            | Self::NoAmountColumn { file }
            | Self::InvalidDate { file, .. }
            | Self::InvalidAmount { file, .. } => file,
        }
    }
}
