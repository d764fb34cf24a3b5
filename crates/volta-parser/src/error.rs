//! Error types for volta-parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported analysis: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, Error>;
