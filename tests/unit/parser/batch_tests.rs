//! Batch and Statement Boundary Tests

use pretty_assertions::assert_eq;
use rust_sqlscripter::parser::ast::StatementNode;
use rust_sqlscripter::parser::{parse_sql, tokenize, tokens_text};
use rust_sqlscripter::ScriptError;

use super::parse_nodes;

// ============================================================================
// Batch Separator Tests
// ============================================================================

#[test]
fn test_go_separates_batches() {
    let script = parse_sql("CREATE TABLE t1 (id INT)\nGO\nCREATE TABLE t2 (id INT)").unwrap();
    assert_eq!(script.batches.len(), 2);
    assert_eq!(script.batches[0].start_line, 1);
    assert_eq!(script.batches[1].start_line, 3);
}

#[test]
fn test_empty_batches_are_dropped() {
    let script = parse_sql("GO\n\nGO\nSELECT 1\nGO\n   \nGO").unwrap();
    assert_eq!(script.batches.len(), 1);
}

#[test]
fn test_byte_order_mark_is_stripped() {
    let nodes = parse_nodes("\u{FEFF}CREATE TABLE t (id INT)");
    assert!(matches!(nodes[0], StatementNode::CreateTable(_)));
}

#[test]
fn test_crlf_script() {
    let sql = "CREATE PROCEDURE dbo.P\r\nAS\r\nSELECT 1\r\nGO\r\nCREATE VIEW dbo.V\r\nAS\r\nSELECT 1 AS X\r\nGO\r\n";
    let script = parse_sql(sql).unwrap();
    let texts: Vec<String> = script
        .statements()
        .map(|(batch, statement)| batch.statement_text(statement))
        .collect();
    assert_eq!(
        texts,
        vec![
            "CREATE PROCEDURE dbo.P\r\nAS\r\nSELECT 1",
            "CREATE VIEW dbo.V\r\nAS\r\nSELECT 1 AS X"
        ]
    );
}

// ============================================================================
// Statement Boundary Tests
// ============================================================================

#[test]
fn test_several_statements_in_one_batch() {
    let nodes = parse_nodes(
        "SET ANSI_NULLS ON;\nSET QUOTED_IDENTIFIER ON\nCREATE USER app WITHOUT LOGIN\nEXEC sp_addrolemember 'db_owner', 'app'",
    );
    let kinds: Vec<&str> = nodes.iter().map(StatementNode::kind_name).collect();
    assert_eq!(kinds, vec!["SET", "SET", "CREATE USER", "EXECUTE"]);
}

#[test]
fn test_routine_owns_rest_of_batch() {
    let nodes = parse_nodes(
        "CREATE PROCEDURE dbo.P AS\nBEGIN\n  SET NOCOUNT ON;\n  CREATE TABLE #t (id INT);\n  EXEC dbo.Other;\nEND",
    );
    assert_eq!(nodes.len(), 1);
    assert!(matches!(nodes[0], StatementNode::CreateProcedure(_)));
}

#[test]
fn test_xml_schema_collection_does_not_own_batch() {
    let nodes = parse_nodes("CREATE XML SCHEMA COLLECTION dbo.S AS N'<a/>';\nCREATE TABLE t (id INT)");
    assert_eq!(nodes.len(), 2);
    assert!(matches!(nodes[0], StatementNode::CreateXmlSchemaCollection(_)));
}

// ============================================================================
// Token and Error Tests
// ============================================================================

#[test]
fn test_tokens_reassemble_source() {
    let sql = "CREATE PROC [a]]b].[c] @p NVARCHAR(10) = N'x''y' AS /* c */ SELECT 0x1F -- end\n";
    assert_eq!(tokens_text(&tokenize(sql).unwrap()), sql);
}

#[test]
fn test_tokenize_error_line_is_script_line() {
    let err = parse_sql("SELECT 1\nGO\nSELECT 2\nSELECT 'open").unwrap_err();
    assert!(matches!(err, ScriptError::SqlTokenizeError { line: 4, .. }));
}
