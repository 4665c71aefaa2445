//! Token stream for T-SQL fragments.
//!
//! Wraps the sqlparser MsSql tokenizer and classifies each token into the
//! small set of kinds the scripting engine needs. Token text is always the
//! exact slice of the source it came from, so concatenating every token's
//! text reproduces the input byte for byte (CRLF line endings, comments,
//! doubled-quote escapes and bracket escapes included).

use std::collections::HashSet;

use once_cell::sync::Lazy;
use sqlparser::dialect::MsSqlDialect;
use sqlparser::tokenizer::{Location, Token, Tokenizer, Whitespace};

use crate::error::{Result, ScriptError};

/// Classification of a token in a T-SQL fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Unquoted, non-reserved word
    Identifier,
    /// `[name]` or `"name"`
    QuotedIdentifier,
    /// `.`
    Dot,
    /// Reserved T-SQL keyword
    Keyword,
    /// `@name` or `@@name`
    Variable,
    StringLiteral,
    NumberLiteral,
    /// `0x...`
    BinaryLiteral,
    Whitespace,
    Comment,
    /// Punctuation, operators and anything else
    Other,
}

/// A classified token together with its raw source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlToken {
    pub kind: TokenKind,
    pub text: String,
}

impl SqlToken {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// Whitespace or comment
    #[inline]
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }

    /// Part of a (possibly multi-part) object name
    #[inline]
    pub fn is_name_part(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier | TokenKind::QuotedIdentifier | TokenKind::Dot
        )
    }

    /// Unquoted word (keyword or identifier) equal to `word`, ignoring case
    #[inline]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self.kind, TokenKind::Identifier | TokenKind::Keyword)
            && self.text.eq_ignore_ascii_case(word)
    }

    /// Punctuation token with exactly this text
    #[inline]
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Other && self.text == punct
    }
}

/// Concatenate the raw text of a token slice.
pub fn tokens_text(tokens: &[SqlToken]) -> String {
    let mut text = String::with_capacity(tokens.iter().map(|t| t.text.len()).sum());
    for token in tokens {
        text.push_str(&token.text);
    }
    text
}

/// Tokenize a T-SQL fragment into classified tokens.
pub fn tokenize(sql: &str) -> Result<Vec<SqlToken>> {
    let dialect = MsSqlDialect {};
    let raw = Tokenizer::new(&dialect, sql)
        .tokenize_with_location()
        .map_err(|e| ScriptError::SqlTokenizeError {
            line: e.location.line as usize,
            message: e.message,
        })?;

    let index = LineIndex::new(sql);
    let mut starts: Vec<usize> = Vec::with_capacity(raw.len() + 1);
    let mut previous = 0;
    for token in &raw {
        // Offsets must never move backwards or the slices below would overlap
        let start = index.offset(token.span.start).max(previous);
        starts.push(start);
        previous = start;
    }
    starts.push(sql.len());

    let mut tokens = Vec::with_capacity(raw.len());
    for (i, token) in raw.iter().enumerate() {
        let text = &sql[starts[i]..starts[i + 1]];
        if text.is_empty() {
            continue;
        }
        tokens.push(SqlToken::new(classify(&token.token), text));
    }

    mark_phrase_keywords(&mut tokens, &["XML", "SCHEMA", "COLLECTION"]);

    Ok(tokens)
}

fn classify(token: &Token) -> TokenKind {
    match token {
        Token::Word(w) if w.quote_style.is_some() => TokenKind::QuotedIdentifier,
        Token::Word(w) if w.value.starts_with('@') => TokenKind::Variable,
        Token::Word(w) if is_reserved_keyword(&w.value) => TokenKind::Keyword,
        Token::Word(_) => TokenKind::Identifier,
        Token::Placeholder(p) if p.starts_with('@') => TokenKind::Variable,
        Token::Period => TokenKind::Dot,
        Token::Whitespace(Whitespace::SingleLineComment { .. })
        | Token::Whitespace(Whitespace::MultiLineComment(_)) => TokenKind::Comment,
        Token::Whitespace(_) => TokenKind::Whitespace,
        Token::Number(_, _) => TokenKind::NumberLiteral,
        Token::HexStringLiteral(_) => TokenKind::BinaryLiteral,
        Token::SingleQuotedString(_)
        | Token::NationalStringLiteral(_)
        | Token::EscapedStringLiteral(_) => TokenKind::StringLiteral,
        _ => TokenKind::Other,
    }
}

/// Reclassify words of a multi-word phrase as keywords where the whole phrase
/// occurs, so that `XML` and `COLLECTION` are never mistaken for a name.
fn mark_phrase_keywords(tokens: &mut [SqlToken], phrase: &[&str]) {
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_trivia())
        .map(|(i, _)| i)
        .collect();

    for window in significant.windows(phrase.len()) {
        let matches = window
            .iter()
            .zip(phrase)
            .all(|(&i, word)| tokens[i].is_word(word));
        if matches {
            for &i in window {
                tokens[i].kind = TokenKind::Keyword;
            }
        }
    }
}

/// Maps sqlparser's 1-based line/column locations back to byte offsets.
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            source,
            line_starts,
        }
    }

    fn offset(&self, location: Location) -> usize {
        let line = (location.line as usize).saturating_sub(1);
        let Some(&start) = self.line_starts.get(line) else {
            return self.source.len();
        };
        let column = (location.column as usize).saturating_sub(1);
        self.source[start..]
            .char_indices()
            .nth(column)
            .map(|(i, _)| start + i)
            .unwrap_or(self.source.len())
    }
}

/// Check a word against the T-SQL reserved keyword list.
pub fn is_reserved_keyword(word: &str) -> bool {
    RESERVED_KEYWORDS.contains(word.to_ascii_uppercase().as_str())
}

static RESERVED_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "ADD", "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "AUTHORIZATION", "BACKUP", "BEGIN",
        "BETWEEN", "BREAK", "BROWSE", "BULK", "BY", "CASCADE", "CASE", "CHECK", "CHECKPOINT",
        "CLOSE", "CLUSTERED", "COALESCE", "COLLATE", "COLUMN", "COMMIT", "COMPUTE",
        "CONSTRAINT", "CONTAINS", "CONTAINSTABLE", "CONTINUE", "CONVERT", "CREATE", "CROSS",
        "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER",
        "CURSOR", "DATABASE", "DBCC", "DEALLOCATE", "DECLARE", "DEFAULT", "DELETE", "DENY",
        "DESC", "DISK", "DISTINCT", "DISTRIBUTED", "DOUBLE", "DROP", "DUMP", "ELSE", "END",
        "ERRLVL", "ESCAPE", "EXCEPT", "EXEC", "EXECUTE", "EXISTS", "EXIT", "EXTERNAL", "FETCH",
        "FILE", "FILLFACTOR", "FOR", "FOREIGN", "FREETEXT", "FREETEXTTABLE", "FROM", "FULL",
        "FUNCTION", "GOTO", "GRANT", "GROUP", "HAVING", "HOLDLOCK", "IDENTITY",
        "IDENTITY_INSERT", "IDENTITYCOL", "IF", "IN", "INDEX", "INNER", "INSERT", "INTERSECT",
        "INTO", "IS", "JOIN", "KEY", "KILL", "LEFT", "LIKE", "LINENO", "LOAD", "MERGE",
        "NATIONAL", "NOCHECK", "NONCLUSTERED", "NOT", "NULL", "NULLIF", "OF", "OFF", "OFFSETS",
        "ON", "OPEN", "OPENDATASOURCE", "OPENQUERY", "OPENROWSET", "OPENXML", "OPTION", "OR",
        "ORDER", "OUTER", "OVER", "PERCENT", "PIVOT", "PLAN", "PRECISION", "PRIMARY", "PRINT",
        "PROC", "PROCEDURE", "PUBLIC", "RAISERROR", "READ", "READTEXT", "RECONFIGURE",
        "REFERENCES", "REPLICATION", "RESTORE", "RESTRICT", "RETURN", "REVERT", "REVOKE",
        "RIGHT", "ROLLBACK", "ROWCOUNT", "ROWGUIDCOL", "RULE", "SAVE", "SCHEMA",
        "SECURITYAUDIT", "SELECT", "SEMANTICKEYPHRASETABLE", "SEMANTICSIMILARITYDETAILSTABLE",
        "SEMANTICSIMILARITYTABLE", "SESSION_USER", "SET", "SETUSER", "SHUTDOWN", "SOME",
        "STATISTICS", "SYSTEM_USER", "TABLE", "TABLESAMPLE", "TEXTSIZE", "THEN", "TO", "TOP",
        "TRAN", "TRANSACTION", "TRIGGER", "TRUNCATE", "TRY_CONVERT", "TSEQUAL", "UNION",
        "UNIQUE", "UNPIVOT", "UPDATE", "UPDATETEXT", "USE", "USER", "VALUES", "VARYING", "VIEW",
        "WAITFOR", "WHEN", "WHERE", "WHILE", "WITH", "WRITETEXT",
    ]
    .into_iter()
    .collect()
});
