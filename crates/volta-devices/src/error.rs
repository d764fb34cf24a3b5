//! Error types for volta-devices.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("no such pin: {0}")]
    NoSuchPin(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
