use thiserror::Error;

use crate::types::RowId;

/// Coarse classification of [`DatabaseError`], used by callers that only
/// need to know what went wrong rather than the details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    NotFound,
    AlreadyExists,
    DuplicateKey,
    UniqueViolation,
    IoFailure,
    Corruption,
    Internal,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Syntax error: {details}")]
    SyntaxError { details: String },

    #[error("Invalid schema for table '{table}': {details}")]
    InvalidSchema { table: String, details: String },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Table '{name}' already exists")]
    TableAlreadyExists { name: String },

    #[error("Column '{name}' not found in table '{table}'")]
    ColumnNotFound { name: String, table: String },

    #[error("Record with id {id} not found in table '{table}'")]
    RowNotFound { table: String, id: RowId },

    #[error("Duplicate primary key {id} in table '{table}'")]
    DuplicateKey { table: String, id: RowId },

    #[error("Violation of UNIQUE constraint on column '{column}': value '{value}' already exists")]
    UniqueViolation { column: String, value: String },

    #[error("Type mismatch for column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Serialization/deserialization error: {details}")]
    SerializationError { details: String },

    #[error("Corrupted table file '{path}' at offset {offset}: {reason}")]
    CorruptedRecord {
        path: String,
        offset: u64,
        reason: String,
    },

    #[error("Internal error: {details}")]
    Internal { details: String },
}

impl DatabaseError {
    pub fn syntax(details: impl Into<String>) -> Self {
        DatabaseError::SyntaxError {
            details: details.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DatabaseError::Io(_) => ErrorKind::IoFailure,
            DatabaseError::SyntaxError { .. }
            | DatabaseError::InvalidSchema { .. }
            | DatabaseError::ColumnNotFound { .. }
            | DatabaseError::TypeMismatch { .. } => ErrorKind::SyntaxError,
            DatabaseError::TableNotFound { .. } | DatabaseError::RowNotFound { .. } => {
                ErrorKind::NotFound
            }
            DatabaseError::TableAlreadyExists { .. } => ErrorKind::AlreadyExists,
            DatabaseError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            DatabaseError::UniqueViolation { .. } => ErrorKind::UniqueViolation,
            DatabaseError::SerializationError { .. } | DatabaseError::CorruptedRecord { .. } => {
                ErrorKind::Corruption
            }
            DatabaseError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
