//! Table Extraction and Scripting Tests

use pretty_assertions::assert_eq;
use rust_sqlscripter::model::{ConstraintType, Identity};
use rust_sqlscripter::{extract_database_from_str, ExtractOptions, ScriptError};

use super::extract;

// ============================================================================
// Column Tests
// ============================================================================

#[test]
fn test_columns_positions_and_nullability() {
    let db = extract(
        "CREATE TABLE [dbo].[Users] (\n    [Id] INT NOT NULL,\n    [Name] NVARCHAR(100) NULL,\n    [Email] VARCHAR(MAX)\n)",
    );
    let table = db.find_table("dbo", "Users").unwrap();

    let summary: Vec<(&str, usize, bool)> = table
        .columns
        .iter()
        .map(|c| (c.name.as_str(), c.position, c.is_nullable))
        .collect();
    assert_eq!(
        summary,
        vec![("Id", 1, false), ("Name", 2, true), ("Email", 3, true)]
    );

    assert_eq!(table.columns[1].type_name, "nvarchar");
    assert_eq!(table.columns[1].length, Some(100));
    assert_eq!(table.columns[2].length, Some(-1));
}

#[test]
fn test_precision_and_scale() {
    let db = extract("CREATE TABLE dbo.Prices (Amount DECIMAL(18, 4) NOT NULL, Rate FLOAT)");
    let table = db.find_table("dbo", "Prices").unwrap();
    let amount = table.find_column("Amount").unwrap();
    assert_eq!((amount.precision, amount.scale), (Some(18), Some(4)));
    assert_eq!(amount.length, None);

    let rate = table.find_column("Rate").unwrap();
    assert_eq!((rate.length, rate.precision, rate.scale), (None, None, None));
}

#[test]
fn test_identity_default_and_rowguid() {
    let db = extract(
        "CREATE TABLE dbo.Orders (\n  Id INT IDENTITY(100, 5) NOT NULL,\n  Created DATETIME NOT NULL CONSTRAINT DF_Orders_Created DEFAULT (getdate()),\n  Status INT DEFAULT 0,\n  RowId UNIQUEIDENTIFIER ROWGUIDCOL NOT NULL\n)",
    );
    let table = db.find_table("dbo", "Orders").unwrap();

    let id = table.find_column("Id").unwrap();
    assert_eq!(id.identity, Some(Identity { seed: 100, increment: 5 }));

    let created = table.find_column("Created").unwrap();
    let default = created.default.as_ref().unwrap();
    assert_eq!(default.name, "DF_Orders_Created");
    assert_eq!(default.expression, "(getdate())");

    let status = table.find_column("Status").unwrap();
    assert_eq!(status.default.as_ref().unwrap().name, "DF_Orders_Status");

    assert!(table.find_column("RowId").unwrap().is_rowguidcol);
}

#[test]
fn test_identity_without_arguments() {
    let db = extract("CREATE TABLE dbo.T (Id BIGINT IDENTITY NOT NULL)");
    let column = &db.find_table("dbo", "T").unwrap().columns[0];
    assert_eq!(column.identity, Some(Identity { seed: 1, increment: 1 }));
}

#[test]
fn test_identity_not_for_replication() {
    let db = extract("CREATE TABLE dbo.A (Id int IDENTITY(1,1) NOT FOR REPLICATION NOT NULL)");
    let id = db.find_table("dbo", "A").unwrap().find_column("Id").unwrap().clone();
    assert_eq!(id.identity, Some(Identity { seed: 1, increment: 1 }));
    assert!(!id.is_nullable);
    assert_eq!(id.script(), "[Id] [int] NOT NULL IDENTITY (1,1)");
}

#[test]
fn test_replication_and_masking_options_do_not_stop_extraction() {
    let db = extract(
        "CREATE TABLE dbo.Contacts (\n  Id INT NOT NULL,\n  ParentId INT NULL REFERENCES dbo.Contacts (Id) NOT FOR REPLICATION,\n  Age INT NULL CHECK NOT FOR REPLICATION (Age > 0),\n  Email VARCHAR(10) MASKED WITH (FUNCTION = 'default()') NULL\n)\nGO\nCREATE PROC dbo.After AS RETURN\nGO\n",
    );
    let table = db.find_table("dbo", "Contacts").unwrap();
    assert_eq!(table.columns.len(), 4);

    let email = table.find_column("Email").unwrap();
    assert_eq!(email.length, Some(10));
    assert!(email.is_nullable);
    assert!(db.find_routine("dbo", "After").is_some());
}

#[test]
fn test_computed_column() {
    let db = extract("CREATE TABLE dbo.Lines (Qty INT, Price MONEY, Total AS (Qty * Price) PERSISTED)");
    let total = db.find_table("dbo", "Lines").unwrap().find_column("Total").unwrap().clone();
    assert_eq!(total.computed_definition.as_deref(), Some("(Qty * Price)"));
    assert!(total.is_persisted);
    assert_eq!(total.position, 3);
}

#[test]
fn test_unsupported_column_types_fail() {
    for sql in [
        "CREATE TABLE dbo.T (Phone dbo.PhoneNumber NOT NULL)",
        "CREATE TABLE dbo.T (Doc XML)",
        "CREATE TABLE dbo.T (Node HIERARCHYID)",
    ] {
        let err = extract_database_from_str(sql, &ExtractOptions::default()).unwrap_err();
        match err {
            ScriptError::UnsupportedType { table, .. } => assert_eq!(table, "T"),
            other => panic!("unexpected error for {}: {}", sql, other),
        }
    }
}

#[test]
fn test_unsupported_type_message_names_type() {
    let err = extract_database_from_str(
        "CREATE TABLE dbo.T (Phone dbo.PhoneNumber NOT NULL)",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unable to parse DataType dbo.PhoneNumber of column [dbo].[T].[Phone]"
    );
}

// ============================================================================
// Constraint Tests
// ============================================================================

#[test]
fn test_table_primary_key_and_unique() {
    let db = extract(
        "CREATE TABLE dbo.Users (\n  Id INT NOT NULL,\n  Email NVARCHAR(200) NOT NULL,\n  CONSTRAINT PK_Users PRIMARY KEY CLUSTERED (Id) WITH (FILLFACTOR = 80, PAD_INDEX = ON),\n  UNIQUE (Email)\n)",
    );
    let table = db.find_table("dbo", "Users").unwrap();
    assert_eq!(table.constraints.len(), 2);

    let pk = table.primary_key().unwrap();
    assert_eq!(pk.name, "PK_Users");
    assert!(pk.clustered);
    assert!(pk.unique);
    assert_eq!(pk.fill_factor, 80);
    assert!(pk.pad_index);
    assert_eq!(pk.columns, vec!["Id"]);

    let uq = &table.constraints[1];
    assert_eq!(uq.constraint_type, ConstraintType::Unique);
    assert_eq!(uq.name, "UQ_Users_Email");
    assert!(!uq.clustered);
}

#[test]
fn test_inline_column_primary_key() {
    let db = extract("CREATE TABLE dbo.T (Id INT NOT NULL PRIMARY KEY, Name NVARCHAR(10))");
    let pk = db.find_table("dbo", "T").unwrap().primary_key().unwrap().clone();
    assert_eq!(pk.name, "PK_T");
    assert_eq!(pk.columns, vec!["Id"]);
    assert!(!pk.clustered);
}

#[test]
fn test_check_and_foreign_keys_are_not_modelled() {
    let db = extract(
        "CREATE TABLE dbo.T (\n  Id INT NOT NULL,\n  ParentId INT NULL,\n  CONSTRAINT CK_T CHECK (Id > 0),\n  CONSTRAINT FK_T FOREIGN KEY (ParentId) REFERENCES dbo.T (Id)\n)",
    );
    assert!(db.find_table("dbo", "T").unwrap().constraints.is_empty());
}

#[test]
fn test_fill_factor_over_100_fails() {
    let err = extract_database_from_str(
        "CREATE TABLE dbo.T (Id INT NOT NULL, CONSTRAINT PK_T PRIMARY KEY (Id) WITH (FILLFACTOR = 150))",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ScriptError::InvalidFillFactor { value: 150, .. }));
}

#[test]
fn test_create_index_attaches_to_table() {
    let db = extract(
        "CREATE TABLE dbo.T (A INT, B INT, C INT)\nGO\nCREATE UNIQUE NONCLUSTERED INDEX IX_T_AB ON dbo.T (A, B DESC) INCLUDE (C) WITH (ALLOW_PAGE_LOCKS = OFF)\nGO\n",
    );
    let table = db.find_table("dbo", "T").unwrap();
    let index = table.indexes().next().unwrap();
    assert_eq!(index.name, "IX_T_AB");
    assert!(index.unique);
    assert_eq!(index.columns, vec!["A", "B"]);
    assert_eq!(index.included_columns, vec!["C"]);
    assert!(!index.allow_page_locks);
    assert_eq!(index.table_name, "T");
}

#[test]
fn test_create_index_on_unknown_table_fails() {
    let err = extract_database_from_str(
        "CREATE INDEX IX ON dbo.Missing (A)",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ScriptError::MalformedStatement {
            statement: "CREATE INDEX",
            line: 1,
            ..
        }
    ));
}

// ============================================================================
// Script Tests
// ============================================================================

#[test]
fn test_table_scripts() {
    let db = extract(
        "CREATE TABLE Users (\n  Id INT IDENTITY NOT NULL,\n  Name NVARCHAR(50) NULL DEFAULT (N''),\n  CONSTRAINT PK_Users PRIMARY KEY CLUSTERED (Id)\n)\nGO\nCREATE INDEX IX_Users_Name ON Users (Name)\nGO\n",
    );
    let table = db.find_table("dbo", "Users").unwrap();

    assert_eq!(
        table.script_create(),
        "CREATE TABLE [dbo].[Users] (\n   \
         [Id] [int] NOT NULL IDENTITY (1,1),\n   \
         [Name] [nvarchar](50) NULL CONSTRAINT [DF_Users_Name] DEFAULT (N''),\n   \
         CONSTRAINT [PK_Users] PRIMARY KEY CLUSTERED ([Id])\n  \
         WITH(IGNORE_DUP_KEY = OFF, FILLFACTOR = 0, PAD_INDEX = OFF, ALLOW_ROW_LOCKS = ON, ALLOW_PAGE_LOCKS = ON, STATISTICS_NORECOMPUTE = OFF)\n)"
    );
    assert!(table
        .script_indexes()
        .starts_with("CREATE NONCLUSTERED INDEX [IX_Users_Name] ON [dbo].[Users] ([Name])"));
    assert_eq!(table.script_drop(), "DROP TABLE [dbo].[Users]");
}

#[test]
fn test_duplicate_table_fails() {
    let err = extract_database_from_str(
        "CREATE TABLE dbo.T (Id INT)\nGO\nCREATE TABLE [DBO].[t] (Id INT)\nGO\n",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ScriptError::DuplicateObject { kind: "TABLE", .. }));
}
