use std::{fmt, io};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A geographic code did not parse as an integer.
    MalformedKey,
    /// A coordinate or counter did not parse.
    MalformedValue,
    /// One of the raw tables had no rows.
    EmptyInput,
    MissingColumn,
    InvalidDateRange,
    Io,
    Csv,
    Json,
    Cache,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::MalformedKey => "malformed key",
            ErrorKind::MalformedValue => "malformed value",
            ErrorKind::EmptyInput => "empty input",
            ErrorKind::MissingColumn => "missing column",
            ErrorKind::InvalidDateRange => "invalid date range",
            ErrorKind::Io => "io",
            ErrorKind::Csv => "csv",
            ErrorKind::Json => "json",
            ErrorKind::Cache => "cache",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed_key(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::MalformedKey, message)
    }

    pub fn malformed_value(message: impl Into<String>) -> Self {
        Error::new(ErrorKind::MalformedValue, message)
    }

    pub fn empty_input(table: &str) -> Self {
        Error::new(ErrorKind::EmptyInput, format!("table {table} has no rows"))
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::new(ErrorKind::Io, value.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::new(ErrorKind::Csv, value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::new(ErrorKind::Json, value.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(value: regex::Error) -> Self {
        Error::new(ErrorKind::Config, value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
