pub mod config;
pub mod database;
pub mod manager;
pub mod record;
pub mod schema;
pub mod table;
