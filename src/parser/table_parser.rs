//! Token-based CREATE TABLE parsing for T-SQL
//!
//! ```sql
//! CREATE TABLE [dbo].[Orders] (
//!     [Id] INT IDENTITY(1, 1) NOT NULL,
//!     [Code] CHAR(3) NOT NULL,
//!     CONSTRAINT [PK_Orders] PRIMARY KEY CLUSTERED ([Id]),
//!     INDEX [IX_Orders_Code] NONCLUSTERED ([Code])
//! ) ON [PRIMARY]
//! ```
//!
//! The body is split into elements at top-level commas; each element is
//! handed to the constraint parser first and to the column parser otherwise.

use super::ast::CreateTableNode;
use super::column_parser::parse_column_definition_tokens;
use super::constraint_parser::parse_table_constraint_tokens;
use super::token::SqlToken;
use super::token_parser_base::TokenParser;

/// Words that open a table-level element other than a column
const TABLE_ELEMENT_WORDS: &[&str] = &["CONSTRAINT", "PRIMARY", "UNIQUE", "CHECK", "FOREIGN", "INDEX"];

pub struct TableTokenParser<'a> {
    base: TokenParser<'a>,
}

impl<'a> TableTokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self {
            base: TokenParser::new(tokens),
        }
    }

    pub fn parse(&mut self) -> Option<CreateTableNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("CREATE")?;
        self.base.expect_word_ci("TABLE")?;

        let name = self.base.parse_schema_object_name()?;
        self.base.skip_trivia();
        self.base.expect_punct("(")?;

        let mut columns = Vec::new();
        let mut constraints = Vec::new();

        for element in self.split_elements()? {
            if is_table_element(element) {
                constraints.push(parse_table_constraint_tokens(element)?);
            } else if is_period_definition(element) {
                // PERIOD FOR SYSTEM_TIME (...)
            } else {
                columns.push(parse_column_definition_tokens(element)?);
            }
        }

        Some(CreateTableNode {
            name,
            columns,
            constraints,
        })
    }

    /// Split the body (after the opening parenthesis) into element slices at
    /// top-level commas, consuming the closing parenthesis.
    fn split_elements(&mut self) -> Option<Vec<&'a [SqlToken]>> {
        let tokens = self.base.tokens();
        let mut elements = Vec::new();
        let mut start = self.base.pos();
        let mut depth = 0usize;

        while let Some(token) = self.base.current_token() {
            let pos = self.base.pos();
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                if depth == 0 {
                    push_element(&mut elements, &tokens[start..pos]);
                    self.base.advance();
                    return Some(elements);
                }
                depth -= 1;
            } else if token.is_punct(",") && depth == 0 {
                push_element(&mut elements, &tokens[start..pos]);
                start = pos + 1;
            }
            self.base.advance();
        }

        // Unbalanced parentheses
        None
    }
}

fn push_element<'a>(elements: &mut Vec<&'a [SqlToken]>, element: &'a [SqlToken]) {
    if element.iter().any(|t| !t.is_trivia()) {
        elements.push(element);
    }
}

fn first_significant(element: &[SqlToken]) -> Option<&SqlToken> {
    element.iter().find(|t| !t.is_trivia())
}

fn is_table_element(element: &[SqlToken]) -> bool {
    first_significant(element).is_some_and(|t| TABLE_ELEMENT_WORDS.iter().any(|w| t.is_word(w)))
}

fn is_period_definition(element: &[SqlToken]) -> bool {
    first_significant(element).is_some_and(|t| t.is_word("PERIOD"))
}

/// Parse a CREATE TABLE statement from its tokens.
pub fn parse_create_table_tokens(tokens: &[SqlToken]) -> Option<CreateTableNode> {
    TableTokenParser::new(tokens).parse()
}
