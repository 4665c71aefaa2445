//! Token-based synonym definition parsing for T-SQL
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE SYNONYM [schema].[name] FOR [target_schema].[target_name]
//! CREATE SYNONYM [schema].[name] FOR [database].[target_schema].[target_name]
//! CREATE SYNONYM [schema].[name] FOR [server].[database].[target_schema].[target_name]
//! ```

use super::ast::CreateSynonymNode;
use super::token::SqlToken;
use super::token_parser_base::TokenParser;

/// Token-based synonym definition parser
pub struct SynonymTokenParser<'a> {
    base: TokenParser<'a>,
}

impl<'a> SynonymTokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self {
            base: TokenParser::new(tokens),
        }
    }

    /// Parse CREATE SYNONYM and return the synonym with its target text
    pub fn parse_create_synonym(&mut self) -> Option<CreateSynonymNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("CREATE")?;
        self.base.expect_word_ci("SYNONYM")?;

        let name = self.base.parse_schema_object_name()?;
        self.base.skip_trivia();
        self.base.expect_word_ci("FOR")?;

        // The target is kept as written; only its validity as a 1-4 part
        // name is checked
        let start = self.base.pos();
        self.base.parse_multi_part_name()?;
        let for_name = self.base.text_between(start, self.base.pos());

        Some(CreateSynonymNode { name, for_name })
    }
}

/// Parse a CREATE SYNONYM statement from its tokens.
pub fn parse_create_synonym_tokens(tokens: &[SqlToken]) -> Option<CreateSynonymNode> {
    SynonymTokenParser::new(tokens).parse_create_synonym()
}
