//! Error types for rust-sqlscripter

use std::path::PathBuf;
use thiserror::Error;

use crate::model::RoutineKind;

/// Result alias used throughout the model and parser modules
pub type Result<T> = std::result::Result<T, ScriptError>;

/// Errors that can occur while extracting a model or scripting its objects
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Unable to script routine {kind} {schema}.{name} as ALTER")]
    UnsupportedAlter {
        kind: RoutineKind,
        schema: String,
        name: String,
    },

    #[error("Unable to parse DataType {type_name} of column [{schema}].[{table}].[{column}]")]
    UnsupportedType {
        type_name: String,
        schema: String,
        table: String,
        column: String,
    },

    #[error("User {user} not found while adding it to role {role}")]
    UserNotFound { user: String, role: String },

    #[error("Duplicate {kind} [{schema}].[{name}]")]
    DuplicateObject {
        kind: &'static str,
        schema: String,
        name: String,
    },

    #[error("Fill factor {value} of [{name}] is outside 0-100")]
    InvalidFillFactor { name: String, value: u32 },

    #[error("Invalid {context}: {value}")]
    InvalidLiteral { context: String, value: String },

    #[error("Malformed {statement} statement at line {line}: {message}")]
    MalformedStatement {
        statement: &'static str,
        line: usize,
        message: String,
    },

    #[error("SQL tokenize error at line {line}: {message}")]
    SqlTokenizeError { line: usize, message: String },

    #[error("Failed to read SQL file: {path}")]
    SqlFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
