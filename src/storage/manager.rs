use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;

use crate::storage::{
    config::DatabaseConfig,
    database::{Database, PathClaims},
};

/// Name -> database registry with create-if-absent semantics.
pub struct DatabaseManager {
    config: DatabaseConfig,
    databases: RwLock<HashMap<String, Arc<Database>>>,
    claimed_paths: PathClaims,
}

impl DatabaseManager {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            databases: RwLock::new(HashMap::new()),
            claimed_paths: PathClaims::default(),
        }
    }

    /// Returns the existing database if one with this name is open.
    pub fn create_database(&self, name: &str) -> Arc<Database> {
        let mut databases = self.databases.write();
        Arc::clone(
            databases
                .entry(name.to_string())
                .or_insert_with(|| {
                    Arc::new(Database::with_claims(
                        name,
                        self.config.clone(),
                        Arc::clone(&self.claimed_paths),
                    ))
                }),
        )
    }

    pub fn get_database(&self, name: &str) -> Option<Arc<Database>> {
        self.databases.read().get(name).cloned()
    }

    pub fn list_databases(&self) -> Vec<String> {
        let mut names: Vec<String> = self.databases.read().keys().cloned().collect();
        names.sort();
        names
    }
}
