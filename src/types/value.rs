use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::error::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Text,
}

impl DataType {
    /// Parse a column type name as written in `CREATE TABLE`.
    pub fn from_string(type_str: &str) -> Result<Self, DatabaseError> {
        match type_str.to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(DataType::Integer),
            "text" | "string" | "varchar" => Ok(DataType::Text),
            other => Err(DatabaseError::syntax(format!(
                "unsupported column type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "int"),
            DataType::Text => write!(f, "text"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i32),
    Text(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Integer,
            Value::Text(_) => DataType::Text,
        }
    }

    pub fn is_compatible_with_type(&self, data_type: &DataType) -> bool {
        self.data_type() == *data_type
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Text(_) => None,
        }
    }

    /// Number of bytes this value occupies in an encoded record.
    pub fn serialized_size(&self) -> usize {
        match self {
            Value::Integer(_) => crate::types::INTEGER_SIZE,
            Value::Text(s) => crate::types::TEXT_LENGTH_PREFIX_SIZE + s.len(),
        }
    }

    /// Coerce a raw literal into a value of the given column type.
    ///
    /// Integer literals that do not parse (or overflow 32 bits) are rejected
    /// instead of being read as zero.
    pub fn from_string(raw: &str, data_type: &DataType) -> Result<Self, DatabaseError> {
        match data_type {
            DataType::Integer => raw.trim().parse::<i32>().map(Value::Integer).map_err(|_| {
                DatabaseError::syntax(format!("invalid integer literal '{}'", raw))
            }),
            DataType::Text => Ok(Value::Text(raw.to_string())),
        }
    }
}

/// The stringified form is what uniqueness sets and join comparisons use.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}
