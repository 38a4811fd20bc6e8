use crate::types::error::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("SQL tokenizing error: {0}")]
    Tokenizer(#[from] sqlparser::tokenizer::TokenizerError),
    #[error("Unknown command: {0}")]
    UnsupportedStatement(String),
    #[error("Expected {expected}, found '{found}'")]
    UnexpectedToken { expected: String, found: String },
    #[error("Expected {expected}, found end of statement")]
    UnexpectedEnd { expected: String },
    #[error("Invalid query structure: {0}")]
    InvalidQuery(String),
    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),
    #[error("Unsupported predicate: {0}")]
    UnsupportedPredicate(String),
}

impl From<PlannerError> for DatabaseError {
    fn from(error: PlannerError) -> Self {
        DatabaseError::syntax(error.to_string())
    }
}
