//! Centralized identifier and literal handling for T-SQL text.
//!
//! # Examples
//!
//! ```ignore
//! use crate::parser::identifier_utils::*;
//!
//! assert_eq!(normalize_identifier("[My]]Table]"), "My]Table");
//! assert_eq!(quote_identifier("My]Table"), "[My]]Table]");
//! assert_eq!(format_object_name("dbo", "Users"), "[dbo].[Users]");
//! assert_eq!(string_literal_value("N'it''s'"), Some("it's".to_string()));
//! ```

/// Strips brackets `[]` or double quotes `""` from an identifier and undoes
/// the doubled closing-delimiter escape.
pub fn normalize_identifier(ident: &str) -> String {
    let trimmed = ident.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('[') && trimmed.ends_with(']') {
        trimmed[1..trimmed.len() - 1].replace("]]", "]")
    } else if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].replace("\"\"", "\"")
    } else {
        trimmed.to_string()
    }
}

/// Wraps a bare identifier in brackets, escaping any `]` it contains.
///
/// ```ignore
/// assert_eq!(quote_identifier("MyTable"), "[MyTable]");
/// assert_eq!(quote_identifier(""), "[]");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Canonical `[schema].[name]` form of an object name.
pub fn format_object_name(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(name))
}

/// Join column names as `[A], [B]` for column lists.
pub fn format_column_list<S: AsRef<str>>(columns: &[S]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Value of a `'...'` or `N'...'` string literal, with `''` unescaped.
///
/// Returns `None` when the text is not a string literal.
pub fn string_literal_value(text: &str) -> Option<String> {
    let body = text
        .strip_prefix('N')
        .or_else(|| text.strip_prefix('n'))
        .unwrap_or(text);
    if body.len() >= 2 && body.starts_with('\'') && body.ends_with('\'') {
        Some(body[1..body.len() - 1].replace("''", "'"))
    } else {
        None
    }
}

/// Render a value as a `'...'` string literal.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
