//! Shared helpers for the feature services.
//!
//! - [`db`]: maps Postgres constraint violations to client errors
//! - [`filters`]: builds `WHERE` clauses with numbered placeholders

pub mod db;
pub mod filters;

pub use db::{map_db_error, map_write_error};
pub use filters::SqlFilters;
