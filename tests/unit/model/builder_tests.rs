//! Model Extraction Tests for routines, synonyms and database options

use pretty_assertions::assert_eq;
use rust_sqlscripter::model::RoutineKind;
use rust_sqlscripter::{extract_database_from_str, ExtractOptions, ScriptError};

use super::extract;

// ============================================================================
// Routine Extraction Tests
// ============================================================================

#[test]
fn test_routine_text_is_exact_statement_text() {
    let sql = "SET NOCOUNT ON\nGO\nCREATE PROCEDURE [dbo].[GetUser]\n    @Id INT -- key\nAS\nBEGIN\n    SELECT * FROM dbo.Users WHERE Id = @Id;\nEND\n\nGO\n";
    let db = extract(sql);

    let routine = db.find_routine("dbo", "GetUser").unwrap();
    assert_eq!(routine.kind, RoutineKind::Procedure);
    assert_eq!(
        routine.text(),
        "CREATE PROCEDURE [dbo].[GetUser]\n    @Id INT -- key\nAS\nBEGIN\n    SELECT * FROM dbo.Users WHERE Id = @Id;\nEND"
    );
}

#[test]
fn test_all_routine_kinds_extracted() {
    let sql = r#"
CREATE PROC Proc1 AS RETURN
GO
CREATE FUNCTION dbo.Func1() RETURNS INT AS BEGIN RETURN 1 END
GO
CREATE VIEW reporting.View1 AS SELECT 1 AS One
GO
CREATE TRIGGER dbo.Trigger1 ON dbo.T AFTER INSERT AS RETURN
GO
CREATE XML SCHEMA COLLECTION dbo.Schema1 AS N'<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema"/>'
GO
"#;
    let db = extract(sql);

    let kinds: Vec<(&str, &str, RoutineKind)> = db
        .routines()
        .iter()
        .map(|r| (r.schema.as_str(), r.name.as_str(), r.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("dbo", "Proc1", RoutineKind::Procedure),
            ("dbo", "Func1", RoutineKind::Function),
            ("reporting", "View1", RoutineKind::View),
            ("dbo", "Trigger1", RoutineKind::Trigger),
            ("dbo", "Schema1", RoutineKind::XmlSchemaCollection),
        ]
    );
}

#[test]
fn test_unqualified_names_use_configured_default_schema() {
    let options = ExtractOptions {
        default_schema: "app".to_string(),
        ..ExtractOptions::default()
    };
    let db = extract_database_from_str("CREATE PROC Proc1 AS RETURN", &options).unwrap();
    assert!(db.find_routine("app", "Proc1").is_some());
    assert_eq!(
        db.routines()[0].script_drop(),
        "DROP PROCEDURE [app].[Proc1]"
    );
}

#[test]
fn test_duplicate_routine_fails() {
    let err = extract_database_from_str(
        "CREATE PROC dbo.P AS RETURN\nGO\nCREATE PROCEDURE [dbo].[p] AS RETURN\nGO\n",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ScriptError::DuplicateObject {
            kind: "PROCEDURE",
            ..
        }
    ));
}

// ============================================================================
// Session Option Tracking Tests
// ============================================================================

#[test]
fn test_session_options_captured_per_routine() {
    let sql = r#"
CREATE PROC dbo.Before AS RETURN
GO
SET QUOTED_IDENTIFIER OFF
GO
SET ANSI_NULLS OFF
GO
CREATE PROC dbo.Legacy AS RETURN
GO
SET ANSI_NULLS, QUOTED_IDENTIFIER ON
GO
CREATE PROC dbo.After AS RETURN
GO
"#;
    let db = extract(sql);

    let flags = |name: &str| {
        let routine = db.find_routine("dbo", name).unwrap();
        (routine.quoted_identifier, routine.ansi_nulls)
    };
    assert_eq!(flags("Before"), (true, true));
    assert_eq!(flags("Legacy"), (false, false));
    assert_eq!(flags("After"), (true, true));
}

#[test]
fn test_alter_database_set_records_props() {
    let sql = "ALTER DATABASE [Sales] SET QUOTED_IDENTIFIER OFF\nGO\nALTER DATABASE CURRENT SET ANSI_NULLS ON\nGO\n";
    let db = extract(sql);
    assert!(!db.find_prop("QUOTED_IDENTIFIER").unwrap().is_on());
    assert!(db.find_prop("ANSI_NULLS").unwrap().is_on());
}

#[test]
fn test_extracted_routine_scripts_against_extracted_defaults() {
    let sql = r#"
ALTER DATABASE CURRENT SET QUOTED_IDENTIFIER OFF
GO
ALTER DATABASE CURRENT SET ANSI_NULLS ON
GO
CREATE PROCEDURE dbo.Foo AS RETURN
GO
"#;
    let db = extract(sql);
    let routine = db.find_routine("dbo", "Foo").unwrap();
    assert_eq!(
        routine.script_create(Some(&db)),
        "SET QUOTED_IDENTIFIER ON\nGO\nCREATE PROCEDURE [dbo].[Foo] AS RETURN\nGO\nSET QUOTED_IDENTIFIER OFF\nGO\n"
    );
}

// ============================================================================
// Synonym and Error Tests
// ============================================================================

#[test]
fn test_synonym_extraction_and_scripts() {
    let db = extract("CREATE SYNONYM dbo.Customers FOR [Crm].[dbo].[Customer]");
    let synonym = db.find_synonym("dbo", "Customers").unwrap();
    assert_eq!(synonym.base_object_name, "[Crm].[dbo].[Customer]");
    assert_eq!(
        synonym.script_create(),
        "CREATE SYNONYM [dbo].[Customers] FOR [Crm].[dbo].[Customer]"
    );
    assert_eq!(synonym.script_drop(), "DROP SYNONYM [dbo].[Customers]");
}

#[test]
fn test_malformed_statement_reports_line() {
    let err = extract_database_from_str(
        "CREATE TABLE dbo.Ok (Id INT)\nGO\n\nCREATE TABLE dbo.Broken (Id INT 42)\nGO\n",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    match err {
        ScriptError::MalformedStatement { statement, line, .. } => {
            assert_eq!(statement, "CREATE TABLE");
            assert_eq!(line, 4);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_unmodelled_statements_are_skipped() {
    let sql = "CREATE SCHEMA sales\nGO\nGRANT EXECUTE ON dbo.P TO app\nGO\nINSERT INTO dbo.T VALUES (1)\nGO\n";
    let db = extract(sql);
    assert!(db.tables().is_empty());
    assert!(db.routines().is_empty());
}
