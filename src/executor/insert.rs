use crate::{
    executor::{Executor, QueryResult},
    planner::logical_plan::InsertPlan,
    storage::database::Database,
    types::{error::DatabaseError, row::Row, value::Value},
};

/// Trait for inserting data into database tables
pub trait Inserter {
    /// Insert a single row into the table
    fn insert(&self, row: Row) -> Result<(), DatabaseError>;

    /// Insert multiple rows in a batch operation. Either every row is
    /// written or none is.
    fn insert_batch(&self, rows: Vec<Row>) -> Result<(), DatabaseError>;

    /// Get the table name this inserter operates on
    fn table_name(&self) -> &str;
}

/// Executes `INSERT INTO ... VALUES (...)`; values map onto columns by position.
pub struct InsertExecutor {
    plan: InsertPlan,
}

impl InsertExecutor {
    pub fn new(plan: InsertPlan) -> Self {
        Self { plan }
    }
}

impl Executor for InsertExecutor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError> {
        let table = database.table(&self.plan.table_name)?;
        let schema = table.schema();

        if self.plan.values.len() != schema.columns.len() {
            return Err(DatabaseError::syntax(format!(
                "table '{}' has {} columns but {} values were supplied",
                schema.table_name,
                schema.columns.len(),
                self.plan.values.len()
            )));
        }

        let values = schema
            .columns
            .iter()
            .zip(&self.plan.values)
            .map(|(column, literal)| Value::from_string(literal.raw(), &column.data_type))
            .collect::<Result<Vec<_>, _>>()?;

        table.insert(Row::from_values(schema, values)?)?;
        Ok(QueryResult::message("Row inserted successfully."))
    }
}
