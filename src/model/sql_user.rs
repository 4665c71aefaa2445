//! Database users and their logins

use std::collections::BTreeSet;

use crate::parser::identifier_utils::{quote_identifier, quote_string};

/// A database user, optionally backed by a SQL login with a hashed password
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlUser {
    pub name: String,
    pub default_schema: Option<String>,
    /// Raw password hash bytes; `None` for users without a SQL login
    pub password_hash: Option<Vec<u8>>,
    pub database_roles: BTreeSet<String>,
}

impl SqlUser {
    pub fn new(name: &str, default_schema: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            default_schema: default_schema.map(str::to_string),
            password_hash: None,
            database_roles: BTreeSet::new(),
        }
    }

    /// CREATE script for the user, its login when a password hash is known,
    /// and one role membership per role.
    pub fn script_create(&self) -> String {
        let user = quote_identifier(&self.name);
        let mut lines = Vec::with_capacity(self.database_roles.len() + 1);

        match &self.password_hash {
            Some(hash) => lines.push(format!(
                "IF SUSER_ID({}) IS NULL\n\tBEGIN CREATE LOGIN {} WITH PASSWORD = 0x{} HASHED END\nCREATE USER {} FOR LOGIN {}",
                quote_string(&self.name),
                user,
                hex::encode_upper(hash),
                user,
                user
            )),
            None => lines.push(format!("CREATE USER {} WITHOUT LOGIN", user)),
        }

        for role in &self.database_roles {
            lines.push(format!(
                "/*ALTER ROLE {} ADD MEMBER {}*/ exec sp_addrolemember {}, {}",
                quote_identifier(role),
                user,
                quote_string(role),
                quote_string(&self.name)
            ));
        }

        lines.join("\n")
    }

    /// Drops the user only; the login is server-wide and left alone.
    pub fn script_drop(&self) -> String {
        format!("DROP USER {}", quote_identifier(&self.name))
    }

    /// `ALTER USER ... WITH DEFAULT_SCHEMA`, or an empty string when the user
    /// has no default schema.
    pub fn script_assign_default_schema(&self) -> String {
        match &self.default_schema {
            Some(schema) => format!(
                "ALTER USER {} WITH DEFAULT_SCHEMA = {}",
                quote_identifier(&self.name),
                quote_identifier(schema)
            ),
            None => String::new(),
        }
    }
}
