//! Constraint and Index Scripting Tests

use pretty_assertions::assert_eq;
use rust_sqlscripter::model::{Constraint, ConstraintType};

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// ============================================================================
// Flag Tests
// ============================================================================

#[test]
fn test_flags_keep_canonical_order() {
    let mut first = Constraint::new("PK_T", ConstraintType::PrimaryKey, "dbo", "T", columns(&["Id"]));
    first.statistics_norecompute = true;
    first.fill_factor = 90;
    first.ignore_dup_key = true;

    let mut second = Constraint::new("PK_T", ConstraintType::PrimaryKey, "dbo", "T", columns(&["Id"]));
    second.ignore_dup_key = true;
    second.fill_factor = 90;
    second.statistics_norecompute = true;

    let expected = "IGNORE_DUP_KEY = ON, FILLFACTOR = 90, PAD_INDEX = OFF, ALLOW_ROW_LOCKS = ON, ALLOW_PAGE_LOCKS = ON, STATISTICS_NORECOMPUTE = ON";
    assert_eq!(first.flags(), expected);
    assert_eq!(second.flags(), expected);
}

#[test]
fn test_flags_render_disabled_locks() {
    let mut constraint = Constraint::new("UQ", ConstraintType::Unique, "dbo", "T", columns(&["A"]));
    constraint.allow_row_locks = false;
    constraint.allow_page_locks = false;
    constraint.pad_index = true;
    assert_eq!(
        constraint.flags(),
        "IGNORE_DUP_KEY = OFF, FILLFACTOR = 0, PAD_INDEX = ON, ALLOW_ROW_LOCKS = OFF, ALLOW_PAGE_LOCKS = OFF, STATISTICS_NORECOMPUTE = OFF"
    );
}

// ============================================================================
// Script Tests
// ============================================================================

#[test]
fn test_primary_key_script() {
    let mut pk = Constraint::new("PK_Users", ConstraintType::PrimaryKey, "dbo", "Users", columns(&["Id"]));
    pk.clustered = true;

    assert_eq!(
        pk.script(),
        "CONSTRAINT [PK_Users] PRIMARY KEY CLUSTERED ([Id])\n  WITH(IGNORE_DUP_KEY = OFF, FILLFACTOR = 0, PAD_INDEX = OFF, ALLOW_ROW_LOCKS = ON, ALLOW_PAGE_LOCKS = ON, STATISTICS_NORECOMPUTE = OFF)"
    );
}

#[test]
fn test_unique_constraint_preserves_column_order() {
    let uq = Constraint::new("UQ_T", ConstraintType::Unique, "dbo", "T", columns(&["B", "A"]));
    let script = uq.script();
    assert!(script.starts_with("CONSTRAINT [UQ_T] UNIQUE NONCLUSTERED ([B], [A])"));
}

#[test]
fn test_index_script_with_include() {
    let mut ix = Constraint::new("IX_T_AB", ConstraintType::Index, "sales", "T", columns(&["A", "B"]));
    ix.included_columns = columns(&["C"]);

    let script = ix.script();
    assert_eq!(
        script,
        "CREATE NONCLUSTERED INDEX [IX_T_AB] ON [sales].[T] ([A], [B])\n  WITH(IGNORE_DUP_KEY = OFF, FILLFACTOR = 0, PAD_INDEX = OFF, ALLOW_ROW_LOCKS = ON, ALLOW_PAGE_LOCKS = ON, STATISTICS_NORECOMPUTE = OFF) INCLUDE ([C])"
    );

    let key_list = script.find("([A], [B])").unwrap();
    let with = script.find("WITH(").unwrap();
    let include = script.find("INCLUDE ([C])").unwrap();
    assert!(key_list < with && with < include);
}

#[test]
fn test_unique_clustered_index_script() {
    let mut ix = Constraint::new("IX_T", ConstraintType::Index, "dbo", "T", columns(&["A"]));
    ix.unique = true;
    ix.clustered = true;
    assert!(ix
        .script()
        .starts_with("CREATE UNIQUE CLUSTERED INDEX [IX_T] ON [dbo].[T] ([A])\n  WITH("));
    assert!(!ix.script().contains("INCLUDE"));
}
