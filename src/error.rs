use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Seqtime errors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Error {
    /// Invalid data, typically a truncated or corrupt encoded block.
    /// The mapping it was being decoded into is left unchanged.
    InvalidData(String),
    /// An internal failure outside the data path, e.g. a background task
    /// that could not be joined during shutdown.
    Internal(String),
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

/// Constructs an Err(Error::InvalidData) for the given format string.
///
/// Expands to the `Err` value directly rather than converting through a
/// `From<Error>` impl on `Result`: both the trait and `Result` are foreign,
/// so such an impl falls outside the orphan rules.
#[macro_export]
macro_rules! errdata {
    ($($args:tt)*) => { Err($crate::error::Error::InvalidData(format!($($args)*))) };
}

/// A seqtime Result returning Error.
pub type Result<T> = std::result::Result<T, Error>;

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::Internal(err.to_string())
    }
}
