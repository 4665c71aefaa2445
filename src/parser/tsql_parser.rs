//! T-SQL script front end: GO batches, statement boundaries and dispatch to
//! the token-based statement parsers.

use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::trace;

use super::ast::StatementNode;
use super::index_parser::parse_create_index_tokens;
use super::routine_parser::{parse_create_routine_tokens, starts_batch_routine};
use super::security_parser::{
    parse_alter_role_membership_tokens, parse_create_login_tokens, parse_create_user_tokens,
    parse_execute_tokens,
};
use super::statement_parser::{
    continuation_words, parse_alter_database_set_tokens, parse_set_options_tokens,
    STATEMENT_START_WORDS,
};
use super::synonym_parser::parse_create_synonym_tokens;
use super::table_parser::parse_create_table_tokens;
use super::token::{tokenize, tokens_text, SqlToken};
use crate::error::{Result, ScriptError};

/// A SQL batch with its content and source location
struct Batch<'a> {
    content: &'a str,
    start_line: usize, // 1-based line number
}

/// One statement of a batch, addressed by inclusive token indices
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStatement {
    pub node: StatementNode,
    pub first_token: usize,
    pub last_token: usize,
}

/// A GO-separated batch: its tokens and the statements found in them
#[derive(Debug, Clone)]
pub struct ParsedBatch {
    /// 1-based line of the batch's first character in the script
    pub start_line: usize,
    pub tokens: Vec<SqlToken>,
    pub statements: Vec<ParsedStatement>,
}

impl ParsedBatch {
    /// Tokens from the statement's first to last token, inclusive
    pub fn statement_tokens(&self, statement: &ParsedStatement) -> &[SqlToken] {
        let end = (statement.last_token + 1).min(self.tokens.len());
        let start = statement.first_token.min(end);
        &self.tokens[start..end]
    }

    /// Exact source text of a statement
    pub fn statement_text(&self, statement: &ParsedStatement) -> String {
        tokens_text(self.statement_tokens(statement))
    }

    /// 1-based script line on which a statement starts
    pub fn line_of(&self, statement: &ParsedStatement) -> usize {
        let end = statement.first_token.min(self.tokens.len());
        self.start_line + newline_count(&self.tokens[..end])
    }
}

/// A whole parsed script
#[derive(Debug, Clone, Default)]
pub struct ParsedScript {
    pub batches: Vec<ParsedBatch>,
}

impl ParsedScript {
    /// Every statement of the script in source order, with its batch
    pub fn statements(&self) -> impl Iterator<Item = (&ParsedBatch, &ParsedStatement)> {
        self.batches
            .iter()
            .flat_map(|batch| batch.statements.iter().map(move |s| (batch, s)))
    }
}

/// Parse a single SQL file
pub fn parse_sql_file(path: &Path) -> Result<ParsedScript> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| ScriptError::SqlFileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
    parse_sql(&content)
}

/// Parse T-SQL script text
pub fn parse_sql(sql: &str) -> Result<ParsedScript> {
    // Strip UTF-8 BOM if present
    let sql = sql.strip_prefix('\u{FEFF}').unwrap_or(sql);

    let mut script = ParsedScript::default();
    for batch in split_batches(sql) {
        if batch.content.trim().is_empty() {
            continue;
        }
        script.batches.push(parse_batch(&batch)?);
    }

    Ok(script)
}

fn parse_batch(batch: &Batch<'_>) -> Result<ParsedBatch> {
    let tokens = tokenize(batch.content).map_err(|e| match e {
        ScriptError::SqlTokenizeError { line, message } => ScriptError::SqlTokenizeError {
            line: batch.start_line + line.saturating_sub(1),
            message,
        },
        other => other,
    })?;

    let mut parsed = ParsedBatch {
        start_line: batch.start_line,
        tokens,
        statements: Vec::new(),
    };

    for (first_token, last_token) in split_statements(&parsed.tokens) {
        let statement_tokens = &parsed.tokens[first_token..=last_token];
        let node = match parse_statement(statement_tokens) {
            Ok(node) => node,
            Err(kind) => {
                let line = parsed.start_line + newline_count(&parsed.tokens[..first_token]);
                return Err(ScriptError::MalformedStatement {
                    statement: kind,
                    line,
                    message: format!("could not parse `{}`", first_line(statement_tokens)),
                });
            }
        };
        trace!(kind = node.kind_name(), first_token, last_token, "parsed statement");
        parsed.statements.push(ParsedStatement {
            node,
            first_token,
            last_token,
        });
    }

    Ok(parsed)
}

/// Find statement boundaries inside a batch as inclusive token ranges that
/// start and end on non-trivia tokens.
fn split_statements(tokens: &[SqlToken]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut pos = 0;

    loop {
        while tokens
            .get(pos)
            .is_some_and(|t| t.is_trivia() || t.is_punct(";"))
        {
            pos += 1;
        }
        let Some(leading) = tokens.get(pos) else {
            break;
        };
        let start = pos;

        // Routine bodies may contain any statement; they own the batch
        if starts_batch_routine(&tokens[start..]) {
            if let Some(last) = tokens.iter().rposition(|t| !t.is_trivia()) {
                ranges.push((start, last));
            }
            break;
        }

        let continuations = continuation_words(&leading.text);
        let mut depth = 0usize;
        let mut last = start;
        pos = start + 1;
        while let Some(token) = tokens.get(pos) {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && token.is_punct(";") {
                break;
            } else if depth == 0
                && STATEMENT_START_WORDS.iter().any(|w| token.is_word(w))
                && !continuations.iter().any(|w| token.is_word(w))
            {
                break;
            }
            if !token.is_trivia() {
                last = pos;
            }
            pos += 1;
        }
        ranges.push((start, last));
    }

    ranges
}

/// Dispatch a statement to its parser. `Err` carries the statement kind of a
/// recognized statement that failed to parse.
fn parse_statement(tokens: &[SqlToken]) -> std::result::Result<StatementNode, &'static str> {
    let words = leading_words(tokens, 3);
    let word = |i: usize| words.get(i).map(String::as_str).unwrap_or("");

    match word(0) {
        "CREATE" => match word(1) {
            "TABLE" => parse_create_table_tokens(tokens)
                .map(StatementNode::CreateTable)
                .ok_or("CREATE TABLE"),
            "UNIQUE" | "CLUSTERED" | "NONCLUSTERED" | "INDEX" => {
                // Columnstore indexes are not modelled
                if word(2) == "COLUMNSTORE" {
                    return Ok(StatementNode::Other);
                }
                parse_create_index_tokens(tokens)
                    .map(StatementNode::CreateIndex)
                    .ok_or("CREATE INDEX")
            }
            "PROC" | "PROCEDURE" | "FUNCTION" | "VIEW" | "TRIGGER" | "OR" | "XML" => {
                if word(1) == "XML" && word(2) != "SCHEMA" {
                    return Ok(StatementNode::Other);
                }
                parse_create_routine_tokens(tokens).ok_or("CREATE ROUTINE")
            }
            "SYNONYM" => parse_create_synonym_tokens(tokens)
                .map(StatementNode::CreateSynonym)
                .ok_or("CREATE SYNONYM"),
            "USER" => parse_create_user_tokens(tokens)
                .map(StatementNode::CreateUser)
                .ok_or("CREATE USER"),
            "LOGIN" => parse_create_login_tokens(tokens)
                .map(StatementNode::CreateLogin)
                .ok_or("CREATE LOGIN"),
            _ => Ok(StatementNode::Other),
        },
        // Dynamic SQL (`EXEC ('...')`) is not a procedure call
        "EXEC" | "EXECUTE" => Ok(parse_execute_tokens(tokens)
            .map(StatementNode::Execute)
            .unwrap_or(StatementNode::Other)),
        "SET" => Ok(parse_set_options_tokens(tokens)
            .map(StatementNode::SetOptions)
            .unwrap_or(StatementNode::Other)),
        "ALTER" if word(1) == "DATABASE" => Ok(parse_alter_database_set_tokens(tokens)
            .map(StatementNode::AlterDatabaseSet)
            .unwrap_or(StatementNode::Other)),
        "ALTER" if word(1) == "ROLE" => Ok(parse_alter_role_membership_tokens(tokens)
            .map(StatementNode::AlterRoleMembership)
            .unwrap_or(StatementNode::Other)),
        _ => Ok(StatementNode::Other),
    }
}

/// First `n` non-trivia tokens, upper-cased
fn leading_words(tokens: &[SqlToken], n: usize) -> Vec<String> {
    tokens
        .iter()
        .filter(|t| !t.is_trivia())
        .take(n)
        .map(|t| t.text.to_ascii_uppercase())
        .collect()
}

fn newline_count(tokens: &[SqlToken]) -> usize {
    tokens
        .iter()
        .map(|t| t.text.bytes().filter(|&b| b == b'\n').count())
        .sum()
}

fn first_line(tokens: &[SqlToken]) -> String {
    let text = tokens_text(tokens);
    text.lines().next().unwrap_or_default().trim().to_string()
}

/// Read a file as UTF-8, falling back to Windows-1252
fn read_file_with_encoding_fallback(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // Common for SQL files created on Windows
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = WINDOWS_1252.decode(&bytes);
            if had_errors {
                Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "File contains invalid characters",
                ))
            } else {
                Ok(decoded.into_owned())
            }
        }
    }
}

/// Split SQL content into batches by GO statement, tracking line numbers
fn split_batches(content: &str) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let mut current_pos = 0;
    let mut batch_start = 0;
    let mut current_line = 1; // 1-based line numbers
    let mut batch_start_line = 1;

    for line in content.lines() {
        let trimmed = line.trim();
        // Actual line length in the original content (including line ending)
        let line_end = current_pos + line.len();
        let next_pos = if content[line_end..].starts_with("\r\n") {
            line_end + 2
        } else if content[line_end..].starts_with('\n') {
            line_end + 1
        } else {
            line_end // End of file, no newline
        };

        // GO must be on its own line, optionally followed by a semicolon
        if trimmed.eq_ignore_ascii_case("go") || trimmed.eq_ignore_ascii_case("go;") {
            if current_pos > batch_start {
                batches.push(Batch {
                    content: &content[batch_start..current_pos],
                    start_line: batch_start_line,
                });
            }
            batch_start = next_pos;
            batch_start_line = current_line + 1; // Next line after GO
        }

        current_pos = next_pos;
        current_line += 1;
    }

    // Add remaining content
    if batch_start < content.len() {
        batches.push(Batch {
            content: &content[batch_start..],
            start_line: batch_start_line,
        });
    }

    batches
}
