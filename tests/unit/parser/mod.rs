//! Unit tests for the T-SQL front end
//!
//! The tests are organized into the following modules:
//! - batch_tests: GO batch splitting and statement boundaries
//! - statement_tests: parse trees produced for each statement kind

use rust_sqlscripter::parser::ast::StatementNode;
use rust_sqlscripter::parser::parse_sql;

mod batch_tests;

/// Helper to parse SQL and return the parse tree of every statement
pub fn parse_nodes(sql: &str) -> Vec<StatementNode> {
    parse_sql(sql)
        .unwrap()
        .statements()
        .map(|(_, statement)| statement.node.clone())
        .collect()
}

/// Helper to parse a script that holds exactly one statement
pub fn parse_single(sql: &str) -> StatementNode {
    let mut nodes = parse_nodes(sql);
    assert_eq!(nodes.len(), 1, "expected one statement in {:?}", sql);
    nodes.remove(0)
}
