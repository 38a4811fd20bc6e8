use crate::{
    executor::{Executor, QueryResult},
    planner::logical_plan::{Predicate, Projection, SelectPlan},
    storage::{database::Database, schema::TableSchema},
    types::error::DatabaseError,
};

/// Executes a single-table `SELECT`: a point lookup with `WHERE id = n`,
/// a full scan otherwise.
pub struct SelectExecutor {
    plan: SelectPlan,
}

impl SelectExecutor {
    pub fn new(plan: SelectPlan) -> Self {
        Self { plan }
    }

    /// Column positions to emit, in the requested order.
    fn projected_columns(&self, schema: &TableSchema) -> Result<Vec<usize>, DatabaseError> {
        match &self.plan.projection {
            Projection::All => Ok((0..schema.columns.len()).collect()),
            Projection::Columns(names) => names
                .iter()
                .map(|name| {
                    schema
                        .get_column_index(name)
                        .ok_or_else(|| DatabaseError::ColumnNotFound {
                            name: name.clone(),
                            table: schema.table_name.clone(),
                        })
                })
                .collect(),
        }
    }
}

impl Executor for SelectExecutor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError> {
        let table = database.table(&self.plan.table_name)?;
        let schema = table.schema();
        let columns = self.projected_columns(schema)?;

        match self.plan.predicate {
            Some(Predicate::IdEquals(id)) => {
                let row = table.select_by_id(id)?;
                Ok(QueryResult::Row(
                    row.map(|row| row.to_json_projected(schema, &columns)),
                ))
            }
            None => {
                let rows = table.select_all()?;
                Ok(QueryResult::Rows(
                    rows.iter()
                        .map(|row| row.to_json_projected(schema, &columns))
                        .collect(),
                ))
            }
        }
    }
}
