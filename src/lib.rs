//! A small embedded relational store.
//!
//! Tables persist rows in append-only files, keep an in-memory primary key
//! index plus uniqueness sets, and are driven by a minimal SQL dialect:
//! `CREATE`, `DROP`, `INSERT`, `SELECT` (with one equality `JOIN`),
//! `UPDATE` and `DELETE`.

pub mod art;
pub mod executor;
pub mod planner;
pub mod storage;
pub mod types;
pub mod utils;

pub use executor::QueryResult;
pub use storage::{
    config::DatabaseConfig, database::Database, manager::DatabaseManager, table::Table,
};
pub use types::error::{DatabaseError, ErrorKind, Result};
