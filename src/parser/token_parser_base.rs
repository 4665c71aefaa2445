//! Base token parser providing common helper methods for T-SQL parsing.
//!
//! Each statement parser (e.g. `TableTokenParser`, `SecurityTokenParser`)
//! holds a `TokenParser` over the statement's token slice and delegates the
//! navigation and checking helpers to it:
//!
//! ```ignore
//! pub struct SynonymTokenParser<'a> {
//!     base: TokenParser<'a>,
//! }
//!
//! impl<'a> SynonymTokenParser<'a> {
//!     pub fn parse(&mut self) -> Option<CreateSynonymNode> {
//!         self.base.skip_trivia();
//!         self.base.expect_word_ci("CREATE")?;
//!         // ...
//!     }
//! }
//! ```

use super::ast::SchemaObjectName;
use super::identifier_utils::normalize_identifier;
use super::token::{tokens_text, SqlToken, TokenKind};

/// Cursor over a classified token slice.
pub struct TokenParser<'a> {
    tokens: &'a [SqlToken],
    pos: usize,
}

impl<'a> TokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self { tokens, pos: 0 }
    }

    // ========================================================================
    // Position and state
    // ========================================================================

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    #[inline]
    pub fn tokens(&self) -> &'a [SqlToken] {
        self.tokens
    }

    // ========================================================================
    // Token access
    // ========================================================================

    #[inline]
    pub fn current_token(&self) -> Option<&'a SqlToken> {
        self.tokens.get(self.pos)
    }

    #[inline]
    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.pos += 1;
        }
    }

    /// Skip whitespace and comment tokens.
    pub fn skip_trivia(&mut self) {
        while self.current_token().is_some_and(SqlToken::is_trivia) {
            self.advance();
        }
    }

    // ========================================================================
    // Token checks
    // ========================================================================

    /// Check if current token is an unquoted word matching (case-insensitive).
    #[inline]
    pub fn check_word_ci(&self, word: &str) -> bool {
        self.current_token().is_some_and(|t| t.is_word(word))
    }

    /// Check if current token is a punctuation token with exactly this text.
    #[inline]
    pub fn check_punct(&self, punct: &str) -> bool {
        self.current_token().is_some_and(|t| t.is_punct(punct))
    }

    #[inline]
    pub fn check_kind(&self, kind: TokenKind) -> bool {
        self.current_token().is_some_and(|t| t.kind == kind)
    }

    /// Expect a word (case-insensitive), advancing and skipping trailing
    /// trivia if found.
    pub fn expect_word_ci(&mut self, word: &str) -> Option<()> {
        if self.check_word_ci(word) {
            self.advance();
            self.skip_trivia();
            Some(())
        } else {
            None
        }
    }

    /// Expect a punctuation token, advancing and skipping trailing trivia if
    /// found.
    pub fn expect_punct(&mut self, punct: &str) -> Option<()> {
        if self.check_punct(punct) {
            self.advance();
            self.skip_trivia();
            Some(())
        } else {
            None
        }
    }

    // ========================================================================
    // Identifier parsing
    // ========================================================================

    /// Parse an identifier (bracketed, double-quoted or bare).
    ///
    /// Returns the identifier value without brackets/quotes.
    pub fn parse_identifier(&mut self) -> Option<String> {
        let token = self.current_token()?;
        match token.kind {
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                self.advance();
                Some(normalize_identifier(&token.text))
            }
            _ => None,
        }
    }

    /// Parse a dot-separated multi-part name (1 to 4 parts).
    pub fn parse_multi_part_name(&mut self) -> Option<Vec<String>> {
        let mut parts = vec![self.parse_identifier()?];

        loop {
            let checkpoint = self.pos;
            self.skip_trivia();
            if !self.check_kind(TokenKind::Dot) {
                self.set_pos(checkpoint);
                break;
            }
            self.advance();
            self.skip_trivia();
            match self.parse_identifier() {
                Some(part) => parts.push(part),
                None => return None,
            }
        }

        if parts.len() > 4 {
            return None;
        }
        Some(parts)
    }

    /// Parse `[schema].[name]`, `schema.name`, `[name]` or `name`.
    ///
    /// Database and server parts of longer names are dropped.
    pub fn parse_schema_object_name(&mut self) -> Option<SchemaObjectName> {
        let mut parts = self.parse_multi_part_name()?;
        let name = parts.pop()?;
        let schema = parts.pop();
        Some(SchemaObjectName { schema, name })
    }

    // ========================================================================
    // Numeric parsing
    // ========================================================================

    /// Parse a signed integer literal, keeping its text (e.g. `-1`).
    pub fn parse_signed_number_text(&mut self) -> Option<String> {
        let start = self.pos;
        let negative = self.check_punct("-");
        if negative || self.check_punct("+") {
            self.advance();
            self.skip_trivia();
        }

        match self.current_token() {
            Some(token) if token.kind == TokenKind::NumberLiteral => {
                self.advance();
                Some(if negative {
                    format!("-{}", token.text)
                } else {
                    token.text.clone()
                })
            }
            _ => {
                self.set_pos(start);
                None
            }
        }
    }

    // ========================================================================
    // Token string conversion
    // ========================================================================

    /// Concatenate tokens from `start` to `end` (exclusive).
    pub fn text_between(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        if start >= end {
            return String::new();
        }
        tokens_text(&self.tokens[start..end])
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// Consume a parenthesized expression and return its text including the
    /// outer parentheses. Position must be at the opening parenthesis.
    pub fn consume_parenthesized(&mut self) -> Option<String> {
        if !self.check_punct("(") {
            return None;
        }

        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.current_token() {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    self.advance();
                    return Some(self.text_between(start, self.pos));
                }
            }
            self.advance();
        }

        self.set_pos(start);
        None
    }

    /// Skip a parenthesized group, handling nested parentheses.
    pub fn skip_parenthesized(&mut self) {
        let _ = self.consume_parenthesized();
    }

    /// Advance until a token at parenthesis depth 0 satisfies `stop`, or the
    /// end of input. The stopping token is not consumed.
    pub fn skip_until(&mut self, stop: impl Fn(&SqlToken) -> bool) {
        let mut depth = 0usize;
        while let Some(token) = self.current_token() {
            if depth == 0 && stop(token) {
                return;
            }
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth = depth.saturating_sub(1);
            }
            self.advance();
        }
    }
}
