//! Table, column and synonym model elements

use super::{Constraint, ConstraintType};
use crate::parser::identifier_utils::{format_object_name, quote_identifier};

/// Named default constraint on a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefault {
    pub name: String,
    /// Expression text as written, e.g. `(getdate())`
    pub expression: String,
}

impl ColumnDefault {
    pub fn script(&self) -> String {
        format!(
            "CONSTRAINT {} DEFAULT {}",
            quote_identifier(&self.name),
            self.expression
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub seed: i64,
    pub increment: i64,
}

impl Identity {
    pub fn script(&self) -> String {
        format!("IDENTITY ({},{})", self.seed, self.increment)
    }
}

/// Table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Base SQL type name; empty for computed columns
    pub type_name: String,
    /// Character/binary length, -1 for MAX
    pub length: Option<i32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub is_nullable: bool,
    pub default: Option<ColumnDefault>,
    pub computed_definition: Option<String>,
    pub is_persisted: bool,
    pub identity: Option<Identity>,
    pub is_rowguidcol: bool,
    /// 1-based, assigned when the column is added to a table
    pub position: usize,
}

impl Column {
    pub fn new(name: &str, type_name: &str, is_nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            length: None,
            precision: None,
            scale: None,
            is_nullable,
            default: None,
            computed_definition: None,
            is_persisted: false,
            identity: None,
            is_rowguidcol: false,
            position: 0,
        }
    }

    pub fn computed(name: &str, definition: &str, is_persisted: bool) -> Self {
        Self {
            computed_definition: Some(definition.to_string()),
            is_persisted,
            ..Self::new(name, "", true)
        }
    }

    /// Type as written in DDL, e.g. `[nvarchar](max)` or `[decimal](18,2)`
    pub fn type_text(&self) -> String {
        let name = quote_identifier(&self.type_name);
        match (self.length, self.precision, self.scale) {
            (Some(-1), _, _) => format!("{}(max)", name),
            (Some(length), _, _) => format!("{}({})", name, length),
            (None, Some(precision), Some(scale)) => format!("{}({},{})", name, precision, scale),
            (None, Some(precision), None) => format!("{}({})", name, precision),
            _ => name,
        }
    }

    /// Column definition as it appears inside CREATE TABLE
    pub fn script(&self) -> String {
        let mut sql = quote_identifier(&self.name);

        if let Some(definition) = &self.computed_definition {
            sql.push_str(" AS ");
            sql.push_str(definition);
            if self.is_persisted {
                sql.push_str(" PERSISTED");
                if !self.is_nullable {
                    sql.push_str(" NOT NULL");
                }
            }
            return sql;
        }

        sql.push(' ');
        sql.push_str(&self.type_text());
        sql.push_str(if self.is_nullable { " NULL" } else { " NOT NULL" });
        if let Some(identity) = &self.identity {
            sql.push(' ');
            sql.push_str(&identity.script());
        }
        if self.is_rowguidcol {
            sql.push_str(" ROWGUIDCOL");
        }
        if let Some(default) = &self.default {
            sql.push(' ');
            sql.push_str(&default.script());
        }
        sql
    }
}

/// User table with its columns and key/index constraints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
}

impl Table {
    pub fn new(schema: &str, name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Append a column, assigning the next 1-based position
    pub fn add_column(&mut self, mut column: Column) {
        column.position = self.columns.len() + 1;
        self.columns.push(column);
    }

    pub fn find_column(&self, name: &str) -> Option<&Column> {
        let name = name.to_lowercase();
        self.columns.iter().find(|c| c.name.to_lowercase() == name)
    }

    pub fn primary_key(&self) -> Option<&Constraint> {
        self.constraints
            .iter()
            .find(|c| c.constraint_type == ConstraintType::PrimaryKey)
    }

    pub fn indexes(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .iter()
            .filter(|c| c.constraint_type == ConstraintType::Index)
    }

    /// CREATE TABLE with columns in position order followed by the key
    /// constraints. Indexes are scripted separately by [`Table::script_indexes`].
    pub fn script_create(&self) -> String {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.position);

        let elements: Vec<String> = columns
            .into_iter()
            .map(Column::script)
            .chain(
                self.constraints
                    .iter()
                    .filter(|c| c.constraint_type != ConstraintType::Index)
                    .map(Constraint::script),
            )
            .collect();

        format!(
            "CREATE TABLE {} (\n   {}\n)",
            format_object_name(&self.schema, &self.name),
            elements.join(",\n   ")
        )
    }

    /// One CREATE INDEX statement per index, newline separated
    pub fn script_indexes(&self) -> String {
        self.indexes()
            .map(Constraint::script)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn script_drop(&self) -> String {
        format!("DROP TABLE {}", format_object_name(&self.schema, &self.name))
    }
}

/// Alias for another object, possibly on another database or server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Synonym {
    pub schema: String,
    pub name: String,
    /// Target reference as written, e.g. `[Other].[dbo].[Customers]`
    pub base_object_name: String,
}

impl Synonym {
    pub fn new(schema: &str, name: &str, base_object_name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            base_object_name: base_object_name.to_string(),
        }
    }

    pub fn script_create(&self) -> String {
        format!(
            "CREATE SYNONYM {} FOR {}",
            format_object_name(&self.schema, &self.name),
            self.base_object_name
        )
    }

    pub fn script_drop(&self) -> String {
        format!("DROP SYNONYM {}", format_object_name(&self.schema, &self.name))
    }
}
