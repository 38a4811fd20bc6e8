use crate::{
    executor::{Executor, QueryResult},
    planner::logical_plan::{Predicate, UpdatePlan},
    storage::database::Database,
    types::{error::DatabaseError, value::Value},
};

/// Executes `UPDATE ... SET ... WHERE id = n` as one read-modify-write.
pub struct UpdateExecutor {
    plan: UpdatePlan,
}

impl UpdateExecutor {
    pub fn new(plan: UpdatePlan) -> Self {
        Self { plan }
    }
}

impl Executor for UpdateExecutor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError> {
        let table = database.table(&self.plan.table_name)?;
        let schema = table.schema();

        // Resolve and coerce every assignment before touching the table.
        let mut changes = Vec::with_capacity(self.plan.assignments.len());
        for assignment in &self.plan.assignments {
            let position = schema
                .get_column_index(&assignment.column)
                .ok_or_else(|| DatabaseError::ColumnNotFound {
                    name: assignment.column.clone(),
                    table: schema.table_name.clone(),
                })?;
            if position == schema.id_position() {
                return Err(DatabaseError::syntax(
                    "the primary key column cannot be updated",
                ));
            }
            let value = Value::from_string(
                assignment.value.raw(),
                &schema.columns[position].data_type,
            )?;
            changes.push((position, value));
        }

        let Predicate::IdEquals(id) = self.plan.predicate;
        table.modify(id, |row| {
            for (position, value) in changes {
                row.set_value(position, value)?;
            }
            Ok(())
        })?;

        Ok(QueryResult::message("Row updated successfully."))
    }
}
