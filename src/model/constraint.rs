//! Primary key, unique and index definitions and their DDL

use crate::parser::identifier_utils::{format_column_list, format_object_name, quote_identifier};

/// Kind of key or index a [`Constraint`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    PrimaryKey,
    Unique,
    /// Standalone index, scripted as `CREATE INDEX`
    Index,
}

impl ConstraintType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintType::PrimaryKey => "PRIMARY KEY",
            ConstraintType::Unique => "UNIQUE",
            ConstraintType::Index => "INDEX",
        }
    }
}

/// A key constraint or index belonging to one table.
///
/// The owning table is referenced by name only; the [`super::Table`] owns
/// the constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    pub table_schema: String,
    pub table_name: String,
    pub constraint_type: ConstraintType,
    pub clustered: bool,
    pub unique: bool,
    /// Key columns in key order
    pub columns: Vec<String>,
    /// Non-key INCLUDE columns (indexes only)
    pub included_columns: Vec<String>,
    pub ignore_dup_key: bool,
    /// 0-100, where 0 means the server default
    pub fill_factor: u8,
    pub pad_index: bool,
    pub allow_row_locks: bool,
    pub allow_page_locks: bool,
    pub statistics_norecompute: bool,
}

impl Constraint {
    /// Create a constraint with SQL Server's default storage options
    pub fn new(
        name: &str,
        constraint_type: ConstraintType,
        table_schema: &str,
        table_name: &str,
        columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            table_schema: table_schema.to_string(),
            table_name: table_name.to_string(),
            constraint_type,
            clustered: false,
            unique: constraint_type != ConstraintType::Index,
            columns,
            included_columns: Vec::new(),
            ignore_dup_key: false,
            fill_factor: 0,
            pad_index: false,
            allow_row_locks: true,
            allow_page_locks: true,
            statistics_norecompute: false,
        }
    }

    pub fn clustered_text(&self) -> &'static str {
        if self.clustered {
            "CLUSTERED"
        } else {
            "NONCLUSTERED"
        }
    }

    /// Render the constraint: an inline `CONSTRAINT` clause for keys, a
    /// `CREATE INDEX` statement for indexes.
    pub fn script(&self) -> String {
        let columns = format_column_list(&self.columns);

        if self.constraint_type == ConstraintType::Index {
            let unique = if self.unique { "UNIQUE " } else { "" };
            let mut sql = format!(
                "CREATE {}{} INDEX {} ON {} ({})\n  WITH({})",
                unique,
                self.clustered_text(),
                quote_identifier(&self.name),
                format_object_name(&self.table_schema, &self.table_name),
                columns,
                self.flags()
            );
            if !self.included_columns.is_empty() {
                sql.push_str(&format!(
                    " INCLUDE ({})",
                    format_column_list(&self.included_columns)
                ));
            }
            return sql;
        }

        format!(
            "CONSTRAINT {} {} {} ({})\n  WITH({})",
            quote_identifier(&self.name),
            self.constraint_type.as_str(),
            self.clustered_text(),
            columns,
            self.flags()
        )
    }

    /// Storage options in their fixed order, e.g.
    /// `IGNORE_DUP_KEY = OFF, FILLFACTOR = 0, PAD_INDEX = OFF, ...`
    pub fn flags(&self) -> String {
        let flags = [
            ("IGNORE_DUP_KEY", on_off(self.ignore_dup_key)),
            ("FILLFACTOR", self.fill_factor.to_string()),
            ("PAD_INDEX", on_off(self.pad_index)),
            ("ALLOW_ROW_LOCKS", on_off(self.allow_row_locks)),
            ("ALLOW_PAGE_LOCKS", on_off(self.allow_page_locks)),
            ("STATISTICS_NORECOMPUTE", on_off(self.statistics_norecompute)),
        ];

        flags
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn on_off(value: bool) -> String {
    if value { "ON" } else { "OFF" }.to_string()
}
