//! Token-based column definition parsing for T-SQL
//!
//! ## Supported Syntax
//!
//! Regular columns:
//! ```sql
//! [Name] TYPE [(params)] [COLLATE name] [IDENTITY(seed, increment)] [NOT NULL|NULL]
//!     [CONSTRAINT name DEFAULT (value)|DEFAULT (value)]
//!     [CONSTRAINT name CHECK (expr)|CHECK (expr)]
//!     [CONSTRAINT name PRIMARY KEY|UNIQUE [CLUSTERED|NONCLUSTERED] [WITH (...)]]
//!     [ROWGUIDCOL] [SPARSE] [FILESTREAM]
//! ```
//!
//! Computed columns:
//! ```sql
//! [Name] AS (expression) [PERSISTED] [NOT NULL]
//! ```

use super::ast::{
    ColumnDefinition, DataTypeReference, DefaultConstraintDefinition, IdentityOptions,
    SchemaObjectName,
};
use super::constraint_parser::parse_unique_body;
use super::token::{SqlToken, TokenKind};
use super::token_parser_base::TokenParser;

/// Built-in SQL Server types that take the simple `type[(p1[, p2])]` shape.
const SQL_TYPES: &[&str] = &[
    "bigint",
    "binary",
    "bit",
    "char",
    "date",
    "datetime",
    "datetime2",
    "datetimeoffset",
    "decimal",
    "float",
    "image",
    "int",
    "money",
    "nchar",
    "ntext",
    "numeric",
    "nvarchar",
    "real",
    "rowversion",
    "smalldatetime",
    "smallint",
    "smallmoney",
    "sql_variant",
    "text",
    "time",
    "timestamp",
    "tinyint",
    "uniqueidentifier",
    "varbinary",
    "varchar",
];

/// Words that begin a column modifier; expressions stop in front of them.
const MODIFIER_WORDS: &[&str] = &[
    "NOT",
    "NULL",
    "CONSTRAINT",
    "DEFAULT",
    "CHECK",
    "PRIMARY",
    "UNIQUE",
    "FOREIGN",
    "REFERENCES",
    "IDENTITY",
    "ROWGUIDCOL",
    "SPARSE",
    "FILESTREAM",
    "PERSISTED",
    "COLLATE",
    "MASKED",
];

fn is_modifier_word(token: &SqlToken) -> bool {
    MODIFIER_WORDS.iter().any(|w| token.is_word(w))
}

/// Token-based column definition parser
pub struct ColumnTokenParser<'a> {
    base: TokenParser<'a>,
}

impl<'a> ColumnTokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self {
            base: TokenParser::new(tokens),
        }
    }

    /// Parse the column definition and return the result
    pub fn parse(&mut self) -> Option<ColumnDefinition> {
        self.base.skip_trivia();
        if self.base.is_at_end() {
            return None;
        }

        let name = self.base.parse_identifier()?;
        self.base.skip_trivia();

        let mut column = ColumnDefinition {
            name,
            data_type: None,
            nullability: None,
            default: None,
            computed_expression: None,
            is_persisted: false,
            identity: None,
            is_rowguidcol: false,
            constraints: Vec::new(),
        };

        if self.base.expect_word_ci("AS").is_some() {
            let start = self.base.pos();
            self.base.skip_until(is_modifier_word);
            let expression = self.base.text_between(start, self.base.pos());
            column.computed_expression = Some(expression.trim().to_string());
        } else {
            column.data_type = Some(self.parse_data_type()?);
        }

        self.parse_column_modifiers(&mut column)?;
        Some(column)
    }

    /// Parse a data type (e.g. `INT`, `NVARCHAR(50)`, `DECIMAL(18, 2)`,
    /// `dbo.Phone`, `xml(dbo.Schemas)`)
    fn parse_data_type(&mut self) -> Option<DataTypeReference> {
        let token = self.base.current_token()?;
        let type_name = match token.kind {
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                self.base.parse_schema_object_name()?
            }
            // Some type names (e.g. `text` or `timestamp`) are not always
            // plain identifiers to the tokenizer
            TokenKind::Keyword => {
                self.base.advance();
                SchemaObjectName::new(None, &token.text)
            }
            _ => return None,
        };
        self.base.skip_trivia();

        let parameters = if self.base.check_punct("(") {
            parse_parenthesized_list(&mut self.base)?
        } else {
            Vec::new()
        };

        if type_name.schema.is_none() {
            let lower = type_name.name.to_ascii_lowercase();
            if lower == "xml" {
                let schema_collection = match parameters.as_slice() {
                    [] => None,
                    [collection] => Some(parse_name_text(collection)?),
                    _ => return None,
                };
                return Some(DataTypeReference::Xml { schema_collection });
            }
            if SQL_TYPES.contains(&lower.as_str()) {
                return Some(DataTypeReference::Sql {
                    name: lower,
                    parameters,
                });
            }
        }

        Some(DataTypeReference::UserDefined(type_name))
    }

    /// Parse column modifiers (IDENTITY, NOT NULL, DEFAULT, CHECK, etc.)
    fn parse_column_modifiers(&mut self, column: &mut ColumnDefinition) -> Option<()> {
        // CONSTRAINT [name] that names the next DEFAULT/PRIMARY KEY/UNIQUE
        let mut pending_constraint_name: Option<String> = None;

        loop {
            self.base.skip_trivia();
            if self.base.is_at_end() {
                break;
            }

            if self.base.expect_word_ci("IDENTITY").is_some() {
                let (seed, increment) = if self.base.check_punct("(") {
                    let mut args = parse_parenthesized_list(&mut self.base)?.into_iter();
                    (args.next(), args.next())
                } else {
                    (None, None)
                };
                column.identity = Some(IdentityOptions { seed, increment });
                continue;
            }

            // NOT NULL, or NOT FOR REPLICATION after IDENTITY/CHECK/REFERENCES
            if self.base.expect_word_ci("NOT").is_some() {
                if self.base.expect_word_ci("FOR").is_some() {
                    self.base.expect_word_ci("REPLICATION")?;
                } else {
                    self.base.expect_word_ci("NULL")?;
                    column.nullability = Some(false);
                }
                continue;
            }

            if self.base.expect_word_ci("NULL").is_some() {
                column.nullability.get_or_insert(true);
                continue;
            }

            if self.base.expect_word_ci("CONSTRAINT").is_some() {
                pending_constraint_name = Some(self.base.parse_identifier()?);
                continue;
            }

            if self.base.expect_word_ci("DEFAULT").is_some() {
                let expression = self.parse_default_value()?;
                column.default = Some(DefaultConstraintDefinition {
                    name: pending_constraint_name.take(),
                    expression,
                });
                continue;
            }

            if self.base.expect_word_ci("CHECK").is_some() {
                pending_constraint_name = None;
                if self.base.expect_word_ci("NOT").is_some() {
                    self.base.expect_word_ci("FOR")?;
                    self.base.expect_word_ci("REPLICATION")?;
                }
                self.base.consume_parenthesized()?;
                continue;
            }

            if self.base.expect_word_ci("PRIMARY").is_some() {
                self.base.expect_word_ci("KEY")?;
                let constraint =
                    parse_unique_body(&mut self.base, pending_constraint_name.take(), true)?;
                column.constraints.push(constraint);
                continue;
            }

            if self.base.expect_word_ci("UNIQUE").is_some() {
                let constraint =
                    parse_unique_body(&mut self.base, pending_constraint_name.take(), false)?;
                column.constraints.push(constraint);
                continue;
            }

            if self.base.check_word_ci("FOREIGN") || self.base.check_word_ci("REFERENCES") {
                pending_constraint_name = None;
                self.base.advance();
                self.base.skip_until(|t| {
                    t.is_word("CONSTRAINT")
                        || t.is_word("DEFAULT")
                        || t.is_word("CHECK")
                        || t.is_word("NOT")
                });
                continue;
            }

            // Dynamic data masking: MASKED WITH (FUNCTION = '...')
            if self.base.expect_word_ci("MASKED").is_some() {
                self.base.expect_word_ci("WITH")?;
                self.base.consume_parenthesized()?;
                continue;
            }

            if self.base.expect_word_ci("COLLATE").is_some() {
                self.base.parse_identifier()?;
                continue;
            }

            if self.base.expect_word_ci("ROWGUIDCOL").is_some() {
                column.is_rowguidcol = true;
                continue;
            }

            if self.base.expect_word_ci("PERSISTED").is_some() {
                column.is_persisted = true;
                continue;
            }

            if self.base.expect_word_ci("SPARSE").is_some()
                || self.base.expect_word_ci("FILESTREAM").is_some()
            {
                continue;
            }

            // Unknown token - stop rather than misread the rest
            return None;
        }

        Some(())
    }

    /// Parse a default value: `(expr)`, `NULL`, or a bare expression up to
    /// the next modifier
    fn parse_default_value(&mut self) -> Option<String> {
        if self.base.check_punct("(") {
            return self.base.consume_parenthesized();
        }

        let start = self.base.pos();
        if self.base.check_word_ci("NULL") {
            self.base.advance();
        } else {
            self.base.skip_until(is_modifier_word);
        }
        let text = self.base.text_between(start, self.base.pos());
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Parse `(a, b, ...)` and return each element's trimmed raw text.
fn parse_parenthesized_list(base: &mut TokenParser<'_>) -> Option<Vec<String>> {
    base.expect_punct("(")?;

    let mut items = Vec::new();
    loop {
        let start = base.pos();
        base.skip_until(|t| t.is_punct(",") || t.is_punct(")"));
        if base.is_at_end() {
            return None;
        }
        let item = base.text_between(start, base.pos()).trim().to_string();
        if !item.is_empty() {
            items.push(item);
        }
        if base.expect_punct(",").is_some() {
            continue;
        }
        base.expect_punct(")")?;
        break;
    }

    Some(items)
}

fn parse_name_text(text: &str) -> Option<SchemaObjectName> {
    let tokens = super::token::tokenize(text).ok()?;
    let mut base = TokenParser::new(&tokens);
    base.skip_trivia();
    if base.expect_word_ci("CONTENT").is_none() {
        let _ = base.expect_word_ci("DOCUMENT");
    }
    base.parse_schema_object_name()
}

/// Parse a column definition element from its tokens.
pub fn parse_column_definition_tokens(tokens: &[SqlToken]) -> Option<ColumnDefinition> {
    ColumnTokenParser::new(tokens).parse()
}
