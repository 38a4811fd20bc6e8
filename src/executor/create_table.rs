use crate::{
    executor::{Executor, QueryResult},
    planner::logical_plan::CreateTablePlan,
    storage::{
        database::Database,
        schema::{ColumnSchema, TableSchema},
    },
    types::error::DatabaseError,
};

/// Executes `CREATE TABLE`.
pub struct CreateTableExecutor {
    plan: CreateTablePlan,
}

impl CreateTableExecutor {
    pub fn new(plan: CreateTablePlan) -> Self {
        Self { plan }
    }

    /// Create table schema and validate it
    fn create_table_schema(&self) -> Result<TableSchema, DatabaseError> {
        let columns = self
            .plan
            .columns
            .iter()
            .enumerate()
            .map(|(position, definition)| {
                let column = ColumnSchema::new(definition.name.clone(), definition.data_type, position);
                if definition.unique { column.unique() } else { column }
            })
            .collect();
        TableSchema::new(self.plan.table_name.clone(), columns)
    }
}

impl Executor for CreateTableExecutor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError> {
        let schema = self.create_table_schema()?;
        let table = database.create_table(schema)?;
        Ok(QueryResult::message(format!(
            "Table '{}' created successfully.",
            table.name()
        )))
    }
}
