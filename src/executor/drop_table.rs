use crate::{
    executor::{Executor, QueryResult},
    planner::logical_plan::DropTablePlan,
    storage::database::Database,
    types::error::DatabaseError,
};

pub struct DropTableExecutor {
    plan: DropTablePlan,
}

impl DropTableExecutor {
    pub fn new(plan: DropTablePlan) -> Self {
        Self { plan }
    }
}

impl Executor for DropTableExecutor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError> {
        database.drop_table(&self.plan.table_name)?;
        Ok(QueryResult::message(format!(
            "Table '{}' dropped.",
            self.plan.table_name
        )))
    }
}
