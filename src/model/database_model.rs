//! Database model representation

use std::collections::BTreeMap;

use super::{Routine, SqlUser, Synonym, Table};
use crate::error::{Result, ScriptError};

/// Schema used for unqualified object names unless configured otherwise
pub const DEFAULT_SCHEMA: &str = "dbo";

/// A database-wide option value, e.g. `QUOTED_IDENTIFIER = ON`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbProp {
    pub name: String,
    /// `"ON"` or `"OFF"` for session options
    pub value: String,
}

impl DbProp {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            value: value.to_string(),
        }
    }

    pub fn is_on(&self) -> bool {
        self.value.eq_ignore_ascii_case("ON")
    }
}

/// The complete database model
///
/// Mutated only while a script is being extracted into it; afterwards it is
/// read-only and may be shared across threads for scripting.
#[derive(Debug, Clone)]
pub struct Database {
    pub name: String,
    pub default_schema: String,
    /// Keyed by upper-cased property name
    props: BTreeMap<String, DbProp>,
    tables: Vec<Table>,
    routines: Vec<Routine>,
    synonyms: Vec<Synonym>,
    /// Keyed by lower-cased user name
    users: BTreeMap<String, SqlUser>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new("")
    }
}

impl Database {
    pub fn new(name: &str) -> Self {
        Self::with_default_schema(name, DEFAULT_SCHEMA)
    }

    pub fn with_default_schema(name: &str, default_schema: &str) -> Self {
        Self {
            name: name.to_string(),
            default_schema: default_schema.to_string(),
            props: BTreeMap::new(),
            tables: Vec::new(),
            routines: Vec::new(),
            synonyms: Vec::new(),
            users: BTreeMap::new(),
        }
    }

    // ========================================================================
    // Properties
    // ========================================================================

    pub fn find_prop(&self, name: &str) -> Option<&DbProp> {
        self.props.get(&name.to_ascii_uppercase())
    }

    pub fn set_prop(&mut self, name: &str, value: &str) {
        let prop = DbProp::new(name, value);
        self.props.insert(prop.name.clone(), prop);
    }

    pub fn props(&self) -> impl Iterator<Item = &DbProp> {
        self.props.values()
    }

    // ========================================================================
    // Objects
    // ========================================================================

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn synonyms(&self) -> &[Synonym] {
        &self.synonyms
    }

    /// Users in name order
    pub fn users(&self) -> impl Iterator<Item = &SqlUser> {
        self.users.values()
    }

    pub fn add_table(&mut self, table: Table) -> Result<()> {
        if self.find_table(&table.schema, &table.name).is_some() {
            return Err(duplicate("TABLE", &table.schema, &table.name));
        }
        self.tables.push(table);
        Ok(())
    }

    pub fn add_routine(&mut self, routine: Routine) -> Result<()> {
        let exists = self.routines.iter().any(|r| {
            r.kind == routine.kind && same_name(&r.schema, &r.name, &routine.schema, &routine.name)
        });
        if exists {
            return Err(duplicate(
                routine.kind.as_str(),
                &routine.schema,
                &routine.name,
            ));
        }
        self.routines.push(routine);
        Ok(())
    }

    pub fn add_synonym(&mut self, synonym: Synonym) -> Result<()> {
        let exists = self
            .synonyms
            .iter()
            .any(|s| same_name(&s.schema, &s.name, &synonym.schema, &synonym.name));
        if exists {
            return Err(duplicate("SYNONYM", &synonym.schema, &synonym.name));
        }
        self.synonyms.push(synonym);
        Ok(())
    }

    pub fn find_table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| same_name(&t.schema, &t.name, schema, name))
    }

    pub fn find_table_mut(&mut self, schema: &str, name: &str) -> Option<&mut Table> {
        self.tables
            .iter_mut()
            .find(|t| same_name(&t.schema, &t.name, schema, name))
    }

    pub fn find_routine(&self, schema: &str, name: &str) -> Option<&Routine> {
        self.routines
            .iter()
            .find(|r| same_name(&r.schema, &r.name, schema, name))
    }

    pub fn find_synonym(&self, schema: &str, name: &str) -> Option<&Synonym> {
        self.synonyms
            .iter()
            .find(|s| same_name(&s.schema, &s.name, schema, name))
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub fn find_user(&self, name: &str) -> Option<&SqlUser> {
        self.users.get(&user_key(name))
    }

    pub fn find_user_mut(&mut self, name: &str) -> Option<&mut SqlUser> {
        self.users.get_mut(&user_key(name))
    }

    /// Look up a user, creating it with the given default schema if absent.
    pub fn find_or_create_user(&mut self, name: &str, default_schema: &str) -> &mut SqlUser {
        self.users
            .entry(user_key(name))
            .or_insert_with(|| SqlUser::new(name, Some(default_schema)))
    }
}

fn user_key(name: &str) -> String {
    name.to_lowercase()
}

fn same_name(schema_a: &str, name_a: &str, schema_b: &str, name_b: &str) -> bool {
    schema_a.to_lowercase() == schema_b.to_lowercase() && name_a.to_lowercase() == name_b.to_lowercase()
}

fn duplicate(kind: &'static str, schema: &str, name: &str) -> ScriptError {
    ScriptError::DuplicateObject {
        kind,
        schema: schema.to_string(),
        name: name.to_string(),
    }
}
