use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookkeeperError {
    #[error("Cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Line {line}: invalid {field}: {reason}")]
    Parse {
        line: u64,
        field: &'static str,
        reason: String,
    },

    #[error("Invalid argument: {0}")]
    Validation(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[allow(dead_code)]
    #[error("PDF error: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, BookkeeperError>;
