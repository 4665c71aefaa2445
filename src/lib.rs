//! rust-sqlscripter: SQL Server object model extraction and script generation
//!
//! This library reads T-SQL scripts into a model of tables, routines,
//! synonyms and users, and regenerates CREATE/ALTER/DROP scripts for those
//! objects. Routine scripts are rewritten from the original token stream so
//! bodies keep their exact formatting.

pub mod error;
pub mod model;
pub mod parser;
pub mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

pub use error::ScriptError;
use model::{Database, SessionOption, DEFAULT_SCHEMA};

/// Options for extracting a database model
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Path to the .sql script to read
    pub source_path: PathBuf,
    /// Name of the database the script belongs to
    pub database_name: String,
    /// Schema for unqualified object names
    pub default_schema: String,
    /// Log skipped statements and routine warnings
    pub verbose: bool,
    /// Database-wide session option defaults; a script's own
    /// `ALTER DATABASE ... SET` statements override these
    pub session_defaults: Vec<(SessionOption, bool)>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            source_path: PathBuf::new(),
            database_name: String::new(),
            default_schema: DEFAULT_SCHEMA.to_string(),
            verbose: false,
            session_defaults: Vec::new(),
        }
    }
}

impl ExtractOptions {
    fn new_database(&self) -> Database {
        let mut db = Database::with_default_schema(&self.database_name, &self.default_schema);
        for (option, on) in &self.session_defaults {
            db.set_prop(option.as_str(), if *on { "ON" } else { "OFF" });
        }
        db
    }
}

/// Extract a database model from the script at `options.source_path`
pub fn extract_database(options: &ExtractOptions) -> Result<Database> {
    info!(path = %options.source_path.display(), "extracting database model");

    // Step 1: Read and parse the script
    let script = parser::parse_sql_file(&options.source_path)?;
    debug!(
        batches = script.batches.len(),
        statements = script.statements().count(),
        "parsed script"
    );

    // Step 2: Build the model
    let db = build(&script, options).with_context(|| {
        format!(
            "Failed to extract model from {}",
            options.source_path.display()
        )
    })?;

    info!(
        tables = db.tables().len(),
        routines = db.routines().len(),
        synonyms = db.synonyms().len(),
        users = db.users().count(),
        "extracted database model"
    );
    Ok(db)
}

/// Extract a database model from script text
pub fn extract_database_from_str(sql: &str, options: &ExtractOptions) -> error::Result<Database> {
    let script = parser::parse_sql(sql)?;
    build(&script, options)
}

fn build(script: &parser::ParsedScript, options: &ExtractOptions) -> error::Result<Database> {
    let mut visitor = model::ModelVisitor::new(options.new_database()).verbose(options.verbose);
    visitor.visit_script(script)?;
    let db = visitor.into_database();

    if options.verbose {
        let routines_with_warnings = db
            .routines()
            .iter()
            .filter(|r| r.warnings().next().is_some())
            .count();
        if routines_with_warnings > 0 {
            warn!(count = routines_with_warnings, "routines with definition warnings");
        }
    }
    Ok(db)
}
