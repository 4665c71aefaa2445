//! Unit tests for the database model
//!
//! These tests verify model extraction from T-SQL scripts and the scripts
//! generated from the extracted objects.

use rust_sqlscripter::model::{Database, Routine, RoutineKind};
use rust_sqlscripter::{extract_database_from_str, ExtractOptions};

mod builder_tests;
mod constraint_tests;
mod table_tests;
mod user_tests;

/// Helper to extract a model with default options
pub fn extract(sql: &str) -> Database {
    extract_database_from_str(sql, &ExtractOptions::default()).unwrap()
}

/// Helper to create a procedure in schema `dbo`
pub fn procedure(name: &str, text: &str) -> Routine {
    Routine::new("dbo", name, RoutineKind::Procedure, text).unwrap()
}

/// Helper to create a database with both session option defaults set
pub fn database_with_defaults(quoted_identifier: &str, ansi_nulls: &str) -> Database {
    let mut db = Database::new("TestDb");
    db.set_prop("QUOTED_IDENTIFIER", quoted_identifier);
    db.set_prop("ANSI_NULLS", ansi_nulls);
    db
}
