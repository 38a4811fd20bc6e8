use crate::{
    executor::{Executor, QueryResult},
    planner::logical_plan::{DeletePlan, Predicate},
    storage::database::Database,
    types::error::DatabaseError,
};

pub struct DeleteExecutor {
    plan: DeletePlan,
}

impl DeleteExecutor {
    pub fn new(plan: DeletePlan) -> Self {
        Self { plan }
    }
}

impl Executor for DeleteExecutor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError> {
        let table = database.table(&self.plan.table_name)?;
        let Predicate::IdEquals(id) = self.plan.predicate;
        table.delete(id)?;
        Ok(QueryResult::message("Row deleted successfully."))
    }
}
