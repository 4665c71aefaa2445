//! Stored routines and their CREATE / ALTER / DROP scripts
//!
//! Scripts are produced by rewriting the routine's original token stream
//! rather than regenerating SQL from a syntax tree, so the body comes back
//! exactly as it was written. Only two things ever change: the declared
//! object name is replaced with its canonical `[schema].[name]` form and,
//! for ALTER scripts, the leading `CREATE` keyword becomes `ALTER`.

use std::fmt;
use std::ops::Range;

use super::session_options::{wrap_with_session_options, SessionOption};
use super::Database;
use crate::error::{Result, ScriptError};
use crate::parser::identifier_utils::{format_object_name, normalize_identifier};
use crate::parser::{tokenize, tokens_text, SqlToken, TokenKind};

/// Kind of stored routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoutineKind {
    Procedure,
    Function,
    Trigger,
    View,
    XmlSchemaCollection,
}

impl RoutineKind {
    /// Kind name as used in messages, e.g. `XmlSchemaCollection`
    pub fn name(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "Procedure",
            RoutineKind::Function => "Function",
            RoutineKind::Trigger => "Trigger",
            RoutineKind::View => "View",
            RoutineKind::XmlSchemaCollection => "XmlSchemaCollection",
        }
    }

    /// Object type keyword(s) as written in DDL, e.g. `XML SCHEMA COLLECTION`
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutineKind::Procedure => "PROCEDURE",
            RoutineKind::Function => "FUNCTION",
            RoutineKind::Trigger => "TRIGGER",
            RoutineKind::View => "VIEW",
            RoutineKind::XmlSchemaCollection => "XML SCHEMA COLLECTION",
        }
    }

    /// Whether the object can be changed in place with an ALTER statement
    pub fn supports_alter(&self) -> bool {
        !matches!(self, RoutineKind::XmlSchemaCollection)
    }

    /// Split the PascalCase kind name into upper-cased words:
    /// `XmlSchemaCollection` becomes `XML SCHEMA COLLECTION`.
    pub fn sql_type(&self) -> String {
        let mut words = String::new();
        for (i, c) in self.name().chars().enumerate() {
            if i > 0 && c.is_uppercase() {
                words.push(' ');
            }
            words.extend(c.to_uppercase());
        }
        words
    }
}

impl fmt::Display for RoutineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Advisory problems found in a routine's definition text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutineWarning {
    NameMismatch { declared: String, expected: String },
    SchemaMismatch { declared: String, expected: String },
    NoDeclaredName,
}

impl fmt::Display for RoutineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutineWarning::NameMismatch { declared, expected } => write!(
                f,
                "Name [{}] in definition does not match routine name [{}]",
                declared, expected
            ),
            RoutineWarning::SchemaMismatch { declared, expected } => write!(
                f,
                "Schema [{}] in definition does not match routine schema [{}]",
                declared, expected
            ),
            RoutineWarning::NoDeclaredName => {
                f.write_str("No object name found in routine definition")
            }
        }
    }
}

/// A stored procedure, function, trigger, view or XML schema collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routine {
    pub schema: String,
    pub name: String,
    pub kind: RoutineKind,
    pub ansi_nulls: bool,
    pub quoted_identifier: bool,
    text: String,
    tokens: Vec<SqlToken>,
}

impl Routine {
    /// Create a routine from its definition text.
    ///
    /// Both session options start ON.
    pub fn new(schema: &str, name: &str, kind: RoutineKind, text: &str) -> Result<Self> {
        Ok(Self::from_tokens(schema, name, kind, tokenize(text)?))
    }

    /// Create a routine from an already tokenized definition
    pub fn from_tokens(schema: &str, name: &str, kind: RoutineKind, tokens: Vec<SqlToken>) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            kind,
            ansi_nulls: true,
            quoted_identifier: true,
            text: tokens_text(&tokens),
            tokens,
        }
    }

    /// Definition text exactly as extracted
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[SqlToken] {
        &self.tokens
    }

    fn session_options(&self) -> [(SessionOption, bool); 2] {
        [
            (SessionOption::QuotedIdentifier, self.quoted_identifier),
            (SessionOption::AnsiNulls, self.ansi_nulls),
        ]
    }

    /// CREATE script with the declared name normalized, wrapped in the SET
    /// statements the routine's session options need.
    pub fn script_create(&self, db: Option<&Database>) -> String {
        let body = normalize_name_tokens(&self.tokens, &self.schema, &self.name);
        wrap_with_session_options(&body, &self.session_options(), db)
    }

    /// ALTER script: the CREATE script with its first `CREATE` keyword
    /// replaced by `ALTER`.
    pub fn script_alter(&self, db: Option<&Database>) -> Result<String> {
        let altered = if self.kind.supports_alter() {
            create_to_alter(&self.tokens)
        } else {
            None
        };
        let Some(altered) = altered else {
            return Err(ScriptError::UnsupportedAlter {
                kind: self.kind,
                schema: self.schema.clone(),
                name: self.name.clone(),
            });
        };

        let body = normalize_name_tokens(&altered, &self.schema, &self.name);
        Ok(wrap_with_session_options(&body, &self.session_options(), db))
    }

    pub fn script_drop(&self) -> String {
        format!(
            "DROP {} {}",
            self.kind.sql_type(),
            format_object_name(&self.schema, &self.name)
        )
    }

    /// Advisory warnings about the definition text, computed on first use.
    pub fn warnings(&self) -> impl Iterator<Item = String> + '_ {
        self.warning_kinds().map(|w| w.to_string())
    }

    pub fn warning_kinds(&self) -> impl Iterator<Item = RoutineWarning> + '_ {
        std::iter::once_with(move || self.check_declared_name()).flatten()
    }

    fn check_declared_name(&self) -> Vec<RoutineWarning> {
        let Some(run) = declared_name_run(&self.tokens) else {
            return vec![RoutineWarning::NoDeclaredName];
        };

        let parts: Vec<String> = self.tokens[run]
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Identifier | TokenKind::QuotedIdentifier))
            .map(|t| normalize_identifier(&t.text))
            .collect();

        let mut warnings = Vec::new();
        if let Some(declared) = parts.last() {
            if declared.to_lowercase() != self.name.to_lowercase() {
                warnings.push(RoutineWarning::NameMismatch {
                    declared: declared.clone(),
                    expected: self.name.clone(),
                });
            }
        }
        if parts.len() >= 2 {
            let declared = &parts[parts.len() - 2];
            if declared.to_lowercase() != self.schema.to_lowercase() {
                warnings.push(RoutineWarning::SchemaMismatch {
                    declared: declared.clone(),
                    expected: self.schema.clone(),
                });
            }
        }
        warnings
    }
}

/// Token range of the first object name in a definition: from the first
/// name part through the last name part of the contiguous run, where
/// whitespace and comments may sit between parts.
fn declared_name_run(tokens: &[SqlToken]) -> Option<Range<usize>> {
    let start = tokens.iter().position(SqlToken::is_name_part)?;
    let mut end = start + 1;
    for (i, token) in tokens.iter().enumerate().skip(start + 1) {
        if token.is_name_part() {
            end = i + 1;
        } else if !token.is_trivia() {
            break;
        }
    }
    Some(start..end)
}

/// Replace the first object name in `tokens` with `[schema].[name]`.
///
/// The first name part of the run carries the canonical name; the other
/// name parts are dropped and any trivia between them is kept. Applying
/// this to its own output yields the same text.
pub fn normalize_name_tokens(tokens: &[SqlToken], schema: &str, name: &str) -> String {
    let run = declared_name_run(tokens);
    let canonical = format_object_name(schema, name);

    tokens
        .iter()
        .enumerate()
        .fold(String::new(), |mut script, (i, token)| {
            match &run {
                Some(run) if run.contains(&i) && token.is_name_part() => {
                    if i == run.start {
                        script.push_str(&canonical);
                    }
                }
                _ => script.push_str(&token.text),
            }
            script
        })
}

/// Copy of `tokens` with the first `CREATE` keyword turned into `ALTER`,
/// or `None` when there is no `CREATE` keyword.
///
/// `CREATE OR ALTER` becomes a plain `ALTER`: the `OR ALTER` words and the
/// whitespace after each are emptied, comments stay.
pub fn create_to_alter(tokens: &[SqlToken]) -> Option<Vec<SqlToken>> {
    let index = tokens
        .iter()
        .position(|t| t.kind == TokenKind::Keyword && t.text.eq_ignore_ascii_case("CREATE"))?;
    let mut altered = tokens.to_vec();
    altered[index].text = "ALTER".to_string();

    let mut words = (index + 1..tokens.len()).filter(|&i| !tokens[i].is_trivia());
    if let (Some(or), Some(alter)) = (words.next(), words.next()) {
        if tokens[or].is_word("OR") && tokens[alter].is_word("ALTER") {
            for word in [or, alter] {
                altered[word].text.clear();
                altered[word + 1..]
                    .iter_mut()
                    .take_while(|t| t.kind == TokenKind::Whitespace)
                    .for_each(|t| t.text.clear());
            }
        }
    }
    Some(altered)
}
