use std::fmt::Display;

/// Custom Result type for minidb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for minidb
///
/// Each variant carries (or renders to) the exact message shown to the user;
/// the session prepends "Error: " when formatting a failed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Statement recognized but malformed
    Syntax(String),
    /// Unknown table or column
    NotFound(String),
    /// INSERT value count differs from the schema column count
    ColumnCountMismatch,
    /// Value rejected by the column's declared type
    TypeError(String),
    /// Duplicate value in a primary-key/unique column
    ConstraintViolation(String),
    /// Begin while active, or commit/rollback while inactive
    TransactionState(String),
    /// Input not matching any statement kind
    UnknownCommand,
    /// Internal error (I/O, serialization)
    Internal(String),
}

impl From<std::num::ParseIntError> for Error {
    fn from(value: std::num::ParseIntError) -> Self {
        Error::Syntax(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl std::error::Error for Error {}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Syntax(msg) => f.write_str(msg),
            Error::NotFound(msg) => f.write_str(msg),
            Error::ColumnCountMismatch => f.write_str("Column count mismatch."),
            Error::TypeError(msg) => f.write_str(msg),
            Error::ConstraintViolation(msg) => f.write_str(msg),
            Error::TransactionState(msg) => f.write_str(msg),
            Error::UnknownCommand => f.write_str("Unknown command."),
            Error::Internal(msg) => f.write_str(msg),
        }
    }
}
