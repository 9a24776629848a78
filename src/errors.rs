use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IO(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("malformed row {row}: expected {expected} columns, found {found}")]
    MalformedRow { row: usize, expected: usize, found: usize },
    #[error("no schedule entry for slot {index} (table has {len} entries)")]
    SlotNotFound { index: usize, len: usize },
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
    #[error("other: {0}")]
    Other(String),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self { AppError::IO(format!("{}", e)) }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        if e.is_io_error() {
            AppError::IO(format!("{}", e))
        } else {
            AppError::Parse(format!("tsv: {}", e))
        }
    }
}
