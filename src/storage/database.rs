use std::{
    collections::{HashMap, HashSet},
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
    sync::Arc,
};

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, error, info, warn};

use crate::{
    executor::{self, QueryResult},
    planner::parser::SqlParser,
    storage::{config::DatabaseConfig, schema::TableSchema, table::Table},
    types::error::DatabaseError,
};

/// Backing file paths currently owned by a table. Shared by every database
/// of a [`DatabaseManager`](crate::storage::manager::DatabaseManager) so two
/// tables never write to the same file.
pub type PathClaims = Arc<Mutex<HashSet<PathBuf>>>;

/// A named set of tables.
///
/// The database lock only guards the name -> table map. Row data is guarded
/// by each table's own lock, so statements against different tables never
/// contend once they hold their `Arc<Table>`.
pub struct Database {
    name: String,
    config: DatabaseConfig,
    tables: RwLock<HashMap<String, Arc<Table>>>,
    claimed_paths: PathClaims,
}

impl Database {
    pub fn open(name: impl Into<String>, config: DatabaseConfig) -> Self {
        Self::with_claims(name, config, PathClaims::default())
    }

    /// Open a database that shares its file path claims with others.
    pub fn with_claims(name: impl Into<String>, config: DatabaseConfig, claimed_paths: PathClaims) -> Self {
        let name = name.into();
        info!("Opening database '{}' in {}", name, config.data_dir().display());
        Self {
            name,
            config,
            tables: RwLock::new(HashMap::new()),
            claimed_paths,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Register a table. An existing backing file with the same name is
    /// reopened and its indexes rebuilt.
    ///
    /// Names that map onto a file already owned by another open table (for
    /// example `"a/b"` and `ab`) are rejected as already existing.
    pub fn create_table(&self, schema: TableSchema) -> Result<Arc<Table>, DatabaseError> {
        let mut tables = self.tables.write();
        if tables.contains_key(&schema.table_name) {
            return Err(DatabaseError::TableAlreadyExists {
                name: schema.table_name,
            });
        }

        let path = self.config.table_path(&self.name, &schema.table_name);
        let mut claimed = self.claimed_paths.lock();
        if claimed.contains(&path) {
            warn!(
                "Table '{}' in database '{}' maps onto {}, which is already in use",
                schema.table_name,
                self.name,
                path.display()
            );
            return Err(DatabaseError::TableAlreadyExists {
                name: schema.table_name,
            });
        }

        let table = Arc::new(Table::open(&self.config, &self.name, schema)?);
        claimed.insert(path);
        drop(claimed);
        tables.insert(table.name().to_string(), Arc::clone(&table));
        info!("Created table '{}' in database '{}'", table.name(), self.name);
        Ok(table)
    }

    /// Unregister a table and delete its file.
    pub fn drop_table(&self, table_name: &str) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write();
        let table = tables
            .remove(table_name)
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: table_name.to_string(),
            })?;
        // The file goes while the name is still reserved, so a concurrent
        // CREATE of the same name cannot have its fresh file deleted.
        let dropped = table.drop_table();
        self.claimed_paths.lock().remove(table.path());
        dropped
    }

    pub fn table(&self, table_name: &str) -> Result<Arc<Table>, DatabaseError> {
        self.tables
            .read()
            .get(table_name)
            .cloned()
            .ok_or_else(|| DatabaseError::TableNotFound {
                name: table_name.to_string(),
            })
    }

    pub fn table_exists(&self, table_name: &str) -> bool {
        self.tables.read().contains_key(table_name)
    }

    /// Sorted table names.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Live rows of a table as column-name -> value objects in schema order.
    pub fn list_rows(&self, table_name: &str) -> Result<Vec<Map<String, JsonValue>>, DatabaseError> {
        let table = self.table(table_name)?;
        let schema = table.schema();
        Ok(table
            .select_all()?
            .iter()
            .map(|row| row.to_json(schema))
            .collect())
    }

    /// Parse and run a single statement.
    pub fn execute(&self, sql: &str) -> Result<QueryResult, DatabaseError> {
        let plan = SqlParser::new().parse_sql(sql)?;
        debug!("Executing {} on database '{}': {}", plan.kind(), self.name, sql.trim());
        executor::execute_plan(self, plan)
    }

    /// Run a statement and render its outcome as one string. Errors are
    /// rendered as `Error: ...`; a panic inside the statement is reported
    /// the same way instead of unwinding into the caller.
    pub fn execute_sql(&self, sql: &str) -> String {
        match panic::catch_unwind(AssertUnwindSafe(|| self.execute(sql))) {
            Ok(Ok(result)) => result.to_string(),
            Ok(Err(e)) => format!("Error: {}", e),
            Err(cause) => {
                let details = cause
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| cause.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!("Statement panicked on database '{}': {}", self.name, details);
                format!(
                    "Error: {}",
                    DatabaseError::Internal {
                        details: format!("statement aborted: {}", details)
                    }
                )
            }
        }
    }
}
