use std::fmt;

use crate::{
    executor::{Executor, QueryResult},
    planner::logical_plan::{ColumnRef, JoinPlan},
    storage::{database::Database, schema::TableSchema},
    types::{error::DatabaseError, row::Row},
};

/// One matching pair of a nested-loop join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinMatch {
    pub left: Row,
    pub right: Row,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinResult {
    pub left_schema: TableSchema,
    pub right_schema: TableSchema,
    pub matches: Vec<JoinMatch>,
}

impl JoinResult {
    /// `<left id> | <left values> <-> <right values>`, id columns left out.
    pub fn format_match(&self, joined: &JoinMatch) -> String {
        let join_values = |row: &Row, schema: &TableSchema| {
            row.non_key_values(schema)
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!(
            "{} | {} <-> {}",
            joined.left.id,
            join_values(&joined.left, &self.left_schema),
            join_values(&joined.right, &self.right_schema)
        )
    }
}

impl fmt::Display for JoinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "--- JOIN RESULT ({} + {}) ---",
            self.left_schema.table_name, self.right_schema.table_name
        )?;
        for joined in &self.matches {
            write!(f, "\n{}", self.format_match(joined))?;
        }
        Ok(())
    }
}

/// Equality join of two tables by comparing every pair of live rows.
pub struct JoinExecutor {
    plan: JoinPlan,
}

impl JoinExecutor {
    pub fn new(plan: JoinPlan) -> Self {
        Self { plan }
    }

    /// Work out which side of the `ON` condition belongs to which table and
    /// return the (left, right) column positions.
    fn resolve_columns(
        &self,
        left: &TableSchema,
        right: &TableSchema,
    ) -> Result<(usize, usize), DatabaseError> {
        let first = &self.plan.left_column;
        let second = &self.plan.right_column;

        let qualifier = |column: &ColumnRef| {
            column.table.clone().ok_or_else(|| {
                DatabaseError::syntax(format!(
                    "join column '{}' must be written as table.column",
                    column.column
                ))
            })
        };
        let first_table = qualifier(first)?;
        let second_table = qualifier(second)?;

        let (left_ref, right_ref) = if first_table == left.table_name && second_table == right.table_name {
            (first, second)
        } else if first_table == right.table_name && second_table == left.table_name {
            (second, first)
        } else {
            return Err(DatabaseError::syntax(format!(
                "join condition {} = {} does not reference tables '{}' and '{}'",
                first.qualified_name(),
                second.qualified_name(),
                left.table_name,
                right.table_name
            )));
        };

        let position = |schema: &TableSchema, column: &ColumnRef| {
            schema
                .get_column_index(&column.column)
                .ok_or_else(|| DatabaseError::ColumnNotFound {
                    name: column.column.clone(),
                    table: schema.table_name.clone(),
                })
        };

        Ok((position(left, left_ref)?, position(right, right_ref)?))
    }
}

impl Executor for JoinExecutor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError> {
        let left_table = database.table(&self.plan.left_table)?;
        let right_table = database.table(&self.plan.right_table)?;
        let left_schema = left_table.schema().clone();
        let right_schema = right_table.schema().clone();
        let (left_column, right_column) = self.resolve_columns(&left_schema, &right_schema)?;

        let left_rows = left_table.select_all()?;
        let right_rows = right_table.select_all()?;

        let mut matches = Vec::new();
        for left in &left_rows {
            let left_value = left.values[left_column].to_string();
            for right in &right_rows {
                if right.values[right_column].to_string() == left_value {
                    matches.push(JoinMatch {
                        left: left.clone(),
                        right: right.clone(),
                    });
                }
            }
        }

        Ok(QueryResult::Join(JoinResult {
            left_schema,
            right_schema,
            matches,
        }))
    }
}
