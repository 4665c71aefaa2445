//! Token-based CREATE INDEX parsing for T-SQL
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE [UNIQUE] [CLUSTERED | NONCLUSTERED] INDEX [name] ON [schema].[table] (columns)
//! CREATE NONCLUSTERED INDEX [IX_Name] ON [dbo].[Table] ([Col1], [Col2] DESC)
//! CREATE UNIQUE CLUSTERED INDEX [IX_Name] ON [dbo].[Table] ([Col]) INCLUDE ([Col2])
//! CREATE NONCLUSTERED INDEX [IX_Name] ON [dbo].[Table] ([Col]) WHERE [Status] = 'Active'
//! CREATE NONCLUSTERED INDEX [IX_Name] ON [dbo].[Table] ([Col]) WITH (FILLFACTOR = 80)
//! ```

use super::ast::{CreateIndexNode, IndexDefinition, IndexOptions};
use super::constraint_parser::{parse_clustering, parse_column_list, parse_index_tail};
use super::token::SqlToken;
use super::token_parser_base::TokenParser;

/// Token-based CREATE INDEX parser
pub struct IndexTokenParser<'a> {
    base: TokenParser<'a>,
}

impl<'a> IndexTokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self {
            base: TokenParser::new(tokens),
        }
    }

    /// Parse CREATE INDEX and return the index with its table
    pub fn parse_create_index(&mut self) -> Option<CreateIndexNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("CREATE")?;

        let unique = self.base.expect_word_ci("UNIQUE").is_some();
        let clustered = parse_clustering(&mut self.base);
        self.base.expect_word_ci("INDEX")?;

        let name = self.base.parse_identifier()?;
        self.base.skip_trivia();
        self.base.expect_word_ci("ON")?;

        let table = self.base.parse_schema_object_name()?;
        self.base.skip_trivia();

        let columns = parse_column_list(&mut self.base)?;

        let mut index = IndexDefinition {
            name,
            unique,
            clustered,
            columns,
            included_columns: Vec::new(),
            options: IndexOptions::default(),
        };
        parse_index_tail(&mut self.base, &mut index)?;

        Some(CreateIndexNode { table, index })
    }
}

/// Parse a CREATE INDEX statement from its tokens.
pub fn parse_create_index_tokens(tokens: &[SqlToken]) -> Option<CreateIndexNode> {
    IndexTokenParser::new(tokens).parse_create_index()
}
