pub mod create_table;
pub mod delete;
pub mod drop_table;
pub mod insert;
pub mod join;
pub mod scan;
pub mod select;
pub mod sequential_scan;
pub mod update;

use std::fmt;

use serde_json::{Map, Value as JsonValue};

use crate::{
    executor::{
        create_table::CreateTableExecutor, delete::DeleteExecutor, drop_table::DropTableExecutor,
        insert::InsertExecutor, join::{JoinExecutor, JoinResult}, select::SelectExecutor,
        update::UpdateExecutor,
    },
    planner::logical_plan::LogicalPlan,
    storage::database::Database,
    types::error::DatabaseError,
};

/// Runs one planned statement against a database.
pub trait Executor {
    fn execute(&self, database: &Database) -> Result<QueryResult, DatabaseError>;
}

/// The single value every statement produces.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Confirmation of a write or DDL statement.
    Message(String),
    /// Point lookup; `None` when the id is absent.
    Row(Option<Map<String, JsonValue>>),
    /// Full scan.
    Rows(Vec<Map<String, JsonValue>>),
    Join(JoinResult),
    Names(Vec<String>),
}

impl QueryResult {
    pub fn message(text: impl Into<String>) -> Self {
        QueryResult::Message(text.into())
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Message(text) => write!(f, "{}", text),
            QueryResult::Row(None) => write!(f, "No results."),
            QueryResult::Row(Some(row)) => write_json(f, row),
            QueryResult::Rows(rows) => write_json(f, rows),
            QueryResult::Join(join) => write!(f, "{}", join),
            QueryResult::Names(names) => write_json(f, names),
        }
    }
}

fn write_json<T: serde::Serialize>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    write!(f, "{}", json)
}

/// Dispatch a plan to the executor for its statement kind.
pub fn execute_plan(database: &Database, plan: LogicalPlan) -> Result<QueryResult, DatabaseError> {
    match plan {
        LogicalPlan::CreateTable(plan) => CreateTableExecutor::new(plan).execute(database),
        LogicalPlan::DropTable(plan) => DropTableExecutor::new(plan).execute(database),
        LogicalPlan::Insert(plan) => InsertExecutor::new(plan).execute(database),
        LogicalPlan::Select(plan) => SelectExecutor::new(plan).execute(database),
        LogicalPlan::Join(plan) => JoinExecutor::new(plan).execute(database),
        LogicalPlan::Update(plan) => UpdateExecutor::new(plan).execute(database),
        LogicalPlan::Delete(plan) => DeleteExecutor::new(plan).execute(database),
    }
}
