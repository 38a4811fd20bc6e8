use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{
    storage::{config::DatabaseConfig, database::Database, schema::TableSchema, table::Table},
    types::error::DatabaseError,
};

/// A database whose table files live in a temporary directory that is
/// removed on drop.
pub struct TempDatabase {
    pub dir: TempDir,
    pub database: Database,
}

impl TempDatabase {
    pub fn new() -> Self {
        Self::with_prefix("lumbung_test")
    }

    pub fn with_prefix(prefix: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .expect("Failed to create temp dir");
        let database = Database::open(prefix, DatabaseConfig::new(dir.path()));
        Self { dir, database }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> DatabaseConfig {
        self.database.config().clone()
    }

    /// Open a table directly on the temp directory, bypassing the database map.
    pub fn open_table(&self, schema: TableSchema) -> Result<Table, DatabaseError> {
        Table::open(&self.config(), self.database.name(), schema)
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.config().table_path(self.database.name(), table_name)
    }

    /// Run statements, panicking on the first failure.
    pub fn run_all(&self, statements: &[&str]) {
        for sql in statements {
            if let Err(e) = self.database.execute(sql) {
                panic!("statement failed: {}: {}", sql, e);
            }
        }
    }
}

impl Default for TempDatabase {
    fn default() -> Self {
        Self::new()
    }
}
