//! Token-based parsing for session and database option statements
//!
//! ```sql
//! SET QUOTED_IDENTIFIER ON
//! SET ANSI_NULLS, QUOTED_IDENTIFIER OFF;
//! ALTER DATABASE [Sales] SET QUOTED_IDENTIFIER OFF
//! ALTER DATABASE CURRENT SET ANSI_NULLS ON WITH NO_WAIT
//! ```

use super::ast::{AlterDatabaseSetNode, SetOptionsNode};
use super::token::{SqlToken, TokenKind};
use super::token_parser_base::TokenParser;

/// Words that start a new statement at parenthesis depth 0
pub const STATEMENT_START_WORDS: &[&str] = &[
    "CREATE", "ALTER", "DROP", "EXEC", "EXECUTE", "SET", "GRANT", "DENY", "REVOKE", "INSERT",
    "UPDATE", "DELETE", "PRINT", "DECLARE", "USE", "IF",
];

/// Statement-start words that may legitimately follow the given statement
/// keyword without starting a new statement (`UPDATE t SET ...`,
/// `ALTER ROLE r DROP MEMBER m`, `GRANT EXECUTE ON ...`,
/// `MERGE ... WHEN MATCHED THEN UPDATE ...`).
pub fn continuation_words(leading: &str) -> &'static [&'static str] {
    match leading.to_ascii_uppercase().as_str() {
        "ALTER" => &["SET", "DROP"],
        "UPDATE" => &["SET"],
        "GRANT" | "DENY" | "REVOKE" => &["EXEC", "EXECUTE", "ALTER", "CREATE", "DELETE", "INSERT", "UPDATE"],
        "MERGE" => &["UPDATE", "DELETE", "INSERT", "SET"],
        _ => &[],
    }
}

/// Token-based option statement parser
pub struct StatementTokenParser<'a> {
    base: TokenParser<'a>,
}

impl<'a> StatementTokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self {
            base: TokenParser::new(tokens),
        }
    }

    /// Parse `SET <option>[, <option>...] ON|OFF`
    ///
    /// Returns `None` for SET statements that are not ON/OFF switches
    /// (`SET @x = 1`, `SET TRANSACTION ISOLATION LEVEL ...`).
    pub fn parse_set_options(&mut self) -> Option<SetOptionsNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("SET")?;

        let mut options = Vec::new();
        loop {
            let token = self.base.current_token()?;
            if !matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword) {
                return None;
            }
            self.base.advance();
            self.base.skip_trivia();
            options.push(token.text.to_ascii_uppercase());

            if self.base.expect_punct(",").is_none() {
                break;
            }
        }

        let on = self.parse_on_off()?;
        Some(SetOptionsNode { options, on })
    }

    /// Parse `ALTER DATABASE <name|CURRENT> SET <option> ON|OFF [WITH ...]`
    pub fn parse_alter_database_set(&mut self) -> Option<AlterDatabaseSetNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("ALTER")?;
        self.base.expect_word_ci("DATABASE")?;

        let database = match self.base.parse_identifier() {
            Some(name) => name,
            None if self.base.check_word_ci("CURRENT") => {
                self.base.advance();
                "CURRENT".to_string()
            }
            None => return None,
        };
        self.base.skip_trivia();
        self.base.expect_word_ci("SET")?;

        let token = self.base.current_token()?;
        if !matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword) {
            return None;
        }
        let option = token.text.to_ascii_uppercase();
        self.base.advance();
        self.base.skip_trivia();

        let on = self.parse_on_off()?;
        Some(AlterDatabaseSetNode {
            database,
            option,
            on,
        })
    }

    fn parse_on_off(&mut self) -> Option<bool> {
        if self.base.expect_word_ci("ON").is_some() {
            Some(true)
        } else if self.base.expect_word_ci("OFF").is_some() {
            Some(false)
        } else {
            None
        }
    }
}

/// Top-level convenience function to parse SET option statements
pub fn parse_set_options_tokens(tokens: &[SqlToken]) -> Option<SetOptionsNode> {
    StatementTokenParser::new(tokens).parse_set_options()
}

/// Top-level convenience function to parse ALTER DATABASE ... SET
pub fn parse_alter_database_set_tokens(tokens: &[SqlToken]) -> Option<AlterDatabaseSetNode> {
    StatementTokenParser::new(tokens).parse_alter_database_set()
}
