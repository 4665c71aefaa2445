//! Token-based routine header parsing for T-SQL
//!
//! Only the header is read; the body is kept as raw token text by the
//! statement splitter.
//!
//! ## Supported Syntax
//!
//! ```sql
//! CREATE PROCEDURE [schema].[name] @p INT AS ...
//! CREATE PROC [schema].[name] AS ...
//! CREATE OR ALTER PROCEDURE [schema].[name] AS ...
//! CREATE FUNCTION [schema].[name] (@p INT) RETURNS INT AS ...
//! CREATE VIEW [schema].[name] WITH SCHEMABINDING AS ...
//! CREATE TRIGGER [schema].[name] ON [schema].[table] AFTER INSERT AS ...
//! CREATE XML SCHEMA COLLECTION [schema].[name] AS N'<xsd:schema ...'
//! ```

use super::ast::{CreateRoutineNode, StatementNode};
use super::token::SqlToken;
use super::token_parser_base::TokenParser;

/// Routine kinds recognized after `CREATE [OR ALTER]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoutineHeader {
    Procedure,
    Function,
    View,
    Trigger,
    XmlSchemaCollection,
}

impl RoutineHeader {
    /// Routines whose body runs to the end of the batch
    fn spans_batch(self) -> bool {
        !matches!(self, RoutineHeader::XmlSchemaCollection)
    }

    fn into_node(self, node: CreateRoutineNode) -> StatementNode {
        match self {
            RoutineHeader::Procedure => StatementNode::CreateProcedure(node),
            RoutineHeader::Function => StatementNode::CreateFunction(node),
            RoutineHeader::View => StatementNode::CreateView(node),
            RoutineHeader::Trigger => StatementNode::CreateTrigger(node),
            RoutineHeader::XmlSchemaCollection => StatementNode::CreateXmlSchemaCollection(node),
        }
    }
}

/// Token-based routine header parser
pub struct RoutineTokenParser<'a> {
    base: TokenParser<'a>,
}

impl<'a> RoutineTokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self {
            base: TokenParser::new(tokens),
        }
    }

    /// Consume `CREATE [OR ALTER] <kind>` and return the kind.
    fn parse_header(&mut self) -> Option<RoutineHeader> {
        self.base.skip_trivia();
        self.base.expect_word_ci("CREATE")?;

        if self.base.expect_word_ci("OR").is_some() {
            self.base.expect_word_ci("ALTER")?;
        }

        if self.base.expect_word_ci("PROCEDURE").is_some() || self.base.expect_word_ci("PROC").is_some()
        {
            Some(RoutineHeader::Procedure)
        } else if self.base.expect_word_ci("FUNCTION").is_some() {
            Some(RoutineHeader::Function)
        } else if self.base.expect_word_ci("VIEW").is_some() {
            Some(RoutineHeader::View)
        } else if self.base.expect_word_ci("TRIGGER").is_some() {
            Some(RoutineHeader::Trigger)
        } else if self.base.expect_word_ci("XML").is_some() {
            self.base.expect_word_ci("SCHEMA")?;
            self.base.expect_word_ci("COLLECTION")?;
            Some(RoutineHeader::XmlSchemaCollection)
        } else {
            None
        }
    }

    /// Parse the routine header and return the matching statement node
    pub fn parse_create_routine(&mut self) -> Option<StatementNode> {
        let header = self.parse_header()?;
        let name = self.base.parse_schema_object_name()?;
        Some(header.into_node(CreateRoutineNode { name }))
    }
}

/// Parse a CREATE PROCEDURE/FUNCTION/VIEW/TRIGGER/XML SCHEMA COLLECTION header.
pub fn parse_create_routine_tokens(tokens: &[SqlToken]) -> Option<StatementNode> {
    RoutineTokenParser::new(tokens).parse_create_routine()
}

/// True when the tokens open a routine whose body extends to the end of the
/// batch (procedures, functions, views and triggers).
pub fn starts_batch_routine(tokens: &[SqlToken]) -> bool {
    RoutineTokenParser::new(tokens)
        .parse_header()
        .is_some_and(RoutineHeader::spans_batch)
}
