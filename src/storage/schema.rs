use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{PRIMARY_KEY_COLUMN, error::DatabaseError, row::Row, value::DataType};

/// Represents a column definition in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    pub position: usize,
    pub primary_key: bool,
    pub unique: bool,
}

impl ColumnSchema {
    /// The column literally named `id` becomes the primary key.
    pub fn new(name: impl Into<String>, data_type: DataType, position: usize) -> Self {
        let name = name.into();
        let primary_key = name == PRIMARY_KEY_COLUMN;
        Self {
            name,
            data_type,
            position,
            primary_key,
            unique: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Whether the column has its own uniqueness set. The primary key is
    /// policed by the offset index instead.
    pub fn has_unique_set(&self) -> bool {
        self.unique && !self.primary_key
    }
}

/// Ordered column definitions of one table. Immutable once the table exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
    id_position: usize,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnSchema>) -> Result<Self, DatabaseError> {
        let table_name = table_name.into();
        let id_position = Self::validate_columns(&table_name, &columns)?;
        Ok(Self {
            table_name,
            columns,
            id_position,
        })
    }

    /// Checks the column list and returns the position of the `id` column.
    fn validate_columns(table_name: &str, columns: &[ColumnSchema]) -> Result<usize, DatabaseError> {
        let invalid = |details: String| DatabaseError::InvalidSchema {
            table: table_name.to_string(),
            details,
        };

        if columns.is_empty() {
            return Err(invalid("table must have at least one column".to_string()));
        }

        let mut column_names = HashSet::new();
        for (i, column) in columns.iter().enumerate() {
            if !column_names.insert(column.name.as_str()) {
                return Err(invalid(format!("duplicate column name: {}", column.name)));
            }
            if column.position != i {
                return Err(invalid(format!(
                    "column '{}' has position {} but is declared at {}",
                    column.name, column.position, i
                )));
            }
        }

        match columns.iter().position(|c| c.name == PRIMARY_KEY_COLUMN) {
            Some(pos) if columns[pos].data_type == DataType::Integer => Ok(pos),
            Some(_) => Err(invalid(format!(
                "column '{}' must be of type int",
                PRIMARY_KEY_COLUMN
            ))),
            None => Err(invalid(format!(
                "table must include an '{}' column of type int",
                PRIMARY_KEY_COLUMN
            ))),
        }
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|col| col.name == name)
    }

    /// Get column index by name
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|col| col.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|col| col.name.clone()).collect()
    }

    pub fn id_position(&self) -> usize {
        self.id_position
    }

    /// Columns that carry a uniqueness set, with their positions.
    pub fn unique_columns(&self) -> impl Iterator<Item = (usize, &ColumnSchema)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, col)| col.has_unique_set())
    }

    /// Validate a row against this schema
    pub fn validate_row(&self, row: &Row) -> Result<(), DatabaseError> {
        if row.values.len() != self.columns.len() {
            return Err(DatabaseError::syntax(format!(
                "row has {} values but table '{}' expects {} columns",
                row.values.len(),
                self.table_name,
                self.columns.len()
            )));
        }

        for (column, value) in self.columns.iter().zip(&row.values) {
            if !value.is_compatible_with_type(&column.data_type) {
                return Err(DatabaseError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type.to_string(),
                    actual: value.data_type().to_string(),
                });
            }
        }

        if row.values[self.id_position].as_integer() != Some(row.id) {
            return Err(DatabaseError::syntax(format!(
                "row key {} does not match its id column",
                row.id
            )));
        }

        Ok(())
    }
}

/// Builder for creating table schemas
pub struct TableSchemaBuilder {
    table_name: String,
    columns: Vec<ColumnSchema>,
}

impl TableSchemaBuilder {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        let position = self.columns.len();
        self.columns.push(ColumnSchema::new(name, data_type, position));
        self
    }

    pub fn add_unique_column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        let position = self.columns.len();
        self.columns
            .push(ColumnSchema::new(name, data_type, position).unique());
        self
    }

    pub fn build(self) -> Result<TableSchema, DatabaseError> {
        TableSchema::new(self.table_name, self.columns)
    }
}
