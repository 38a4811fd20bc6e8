use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{
    storage::schema::TableSchema,
    types::{RowId, error::DatabaseError, value::Value},
};

/// A single record. `values` is positional in schema order and includes the
/// `id` column, so `values[id_position]` always mirrors `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: RowId,
    pub values: Vec<Value>,
}

impl Row {
    pub fn new(id: RowId, values: Vec<Value>) -> Self {
        Self { id, values }
    }

    /// Build a row from positional values, taking the key from the `id` column.
    pub fn from_values(schema: &TableSchema, values: Vec<Value>) -> Result<Self, DatabaseError> {
        let id_position = schema.id_position();
        let id = values
            .get(id_position)
            .and_then(Value::as_integer)
            .ok_or_else(|| DatabaseError::TypeMismatch {
                column: crate::types::PRIMARY_KEY_COLUMN.to_string(),
                expected: "int".to_string(),
                actual: values
                    .get(id_position)
                    .map(|v| v.data_type().to_string())
                    .unwrap_or_else(|| "nothing".to_string()),
            })?;
        let row = Self { id, values };
        schema.validate_row(&row)?;
        Ok(row)
    }

    pub fn set_value(&mut self, column_index: usize, value: Value) -> Result<(), DatabaseError> {
        if column_index >= self.values.len() {
            return Err(DatabaseError::Internal {
                details: format!("column index {} out of bounds", column_index),
            });
        }
        self.values[column_index] = value;
        Ok(())
    }

    /// Look a value up by column name.
    pub fn get(&self, schema: &TableSchema, column: &str) -> Option<&Value> {
        schema
            .get_column_index(column)
            .and_then(|index| self.values.get(index))
    }

    /// Column-name to value mapping, keys in schema order.
    pub fn to_json(&self, schema: &TableSchema) -> Map<String, JsonValue> {
        let all: Vec<usize> = (0..schema.columns.len()).collect();
        self.to_json_projected(schema, &all)
    }

    pub fn to_json_projected(&self, schema: &TableSchema, columns: &[usize]) -> Map<String, JsonValue> {
        let mut map = Map::with_capacity(columns.len());
        for &index in columns {
            if let (Some(column), Some(value)) = (schema.columns.get(index), self.values.get(index)) {
                let json = match value {
                    Value::Integer(i) => JsonValue::from(*i),
                    Value::Text(s) => JsonValue::from(s.as_str()),
                };
                map.insert(column.name.clone(), json);
            }
        }
        map
    }

    /// Values of every column except `id`, in schema order.
    pub fn non_key_values<'a>(&'a self, schema: &'a TableSchema) -> impl Iterator<Item = &'a Value> + 'a {
        let id_position = schema.id_position();
        self.values
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != id_position)
            .map(|(_, v)| v)
    }
}
