pub mod error;
pub mod logical_plan;
pub mod parser;
