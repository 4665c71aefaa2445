//! Token-based constraint parsing for T-SQL
//!
//! ## Supported Syntax
//!
//! Table-level constraints:
//! ```sql
//! CONSTRAINT [name] PRIMARY KEY CLUSTERED ([Col1], [Col2] DESC) WITH (FILLFACTOR = 80)
//! CONSTRAINT [name] UNIQUE NONCLUSTERED ([Col1]) ON [PRIMARY]
//! CONSTRAINT [name] FOREIGN KEY ([Col]) REFERENCES [Table]([Col])
//! CONSTRAINT [name] CHECK ([expression])
//! PRIMARY KEY ([Col1])  -- unnamed
//! INDEX [IX_name] NONCLUSTERED ([Col1]) INCLUDE ([Col2])
//! ```
//!
//! The column-list and `WITH (...)` helpers are shared with the column and
//! CREATE INDEX parsers.

use super::ast::{IndexDefinition, IndexOptions, TableConstraint, UniqueConstraintDefinition};
use super::token::{SqlToken, TokenKind};
use super::token_parser_base::TokenParser;

/// Parse one table-level constraint element of a CREATE TABLE body.
pub fn parse_table_constraint_tokens(tokens: &[SqlToken]) -> Option<TableConstraint> {
    let mut base = TokenParser::new(tokens);
    base.skip_trivia();

    let name = if base.expect_word_ci("CONSTRAINT").is_some() {
        let name = base.parse_identifier()?;
        base.skip_trivia();
        Some(name)
    } else {
        None
    };

    if base.expect_word_ci("PRIMARY").is_some() {
        base.expect_word_ci("KEY")?;
        return parse_unique_body(&mut base, name, true).map(TableConstraint::Unique);
    }

    if base.expect_word_ci("UNIQUE").is_some() {
        return parse_unique_body(&mut base, name, false).map(TableConstraint::Unique);
    }

    if base.check_word_ci("CHECK") {
        return Some(TableConstraint::Other {
            name,
            kind: "CHECK",
        });
    }

    if base.check_word_ci("FOREIGN") {
        return Some(TableConstraint::Other {
            name,
            kind: "FOREIGN KEY",
        });
    }

    if name.is_none() && base.expect_word_ci("INDEX").is_some() {
        return parse_inline_index(&mut base).map(TableConstraint::Index);
    }

    None
}

/// Parse the rest of a PRIMARY KEY / UNIQUE constraint after its keywords.
///
/// Columns are optional so the same routine serves inline column
/// constraints, where the owning column is implied.
pub(crate) fn parse_unique_body(
    base: &mut TokenParser<'_>,
    name: Option<String>,
    is_primary_key: bool,
) -> Option<UniqueConstraintDefinition> {
    let clustered = parse_clustering(base);

    let columns = if base.check_punct("(") {
        parse_column_list(base)?
    } else {
        Vec::new()
    };

    let mut options = IndexOptions::default();
    loop {
        base.skip_trivia();
        if base.is_at_end() || is_column_modifier_start(base) {
            break;
        }
        if base.expect_word_ci("WITH").is_some() {
            options = parse_with_options(base)?;
            continue;
        }
        if base.expect_word_ci("ON").is_some() {
            // Filegroup or partition scheme
            let _ = base.parse_identifier();
            base.skip_trivia();
            if base.check_punct("(") {
                base.skip_parenthesized();
            }
            continue;
        }
        break;
    }

    Some(UniqueConstraintDefinition {
        name,
        is_primary_key,
        clustered,
        columns,
        options,
    })
}

/// Words that start the next column modifier after an inline constraint
fn is_column_modifier_start(base: &TokenParser<'_>) -> bool {
    ["NOT", "NULL", "CONSTRAINT", "DEFAULT", "CHECK", "IDENTITY", "ROWGUIDCOL", "REFERENCES"]
        .iter()
        .any(|w| base.check_word_ci(w))
}

fn parse_inline_index(base: &mut TokenParser<'_>) -> Option<IndexDefinition> {
    let name = base.parse_identifier()?;
    base.skip_trivia();

    let unique = base.expect_word_ci("UNIQUE").is_some();
    let clustered = parse_clustering(base);
    let columns = parse_column_list(base)?;

    let mut index = IndexDefinition {
        name,
        unique,
        clustered,
        columns,
        included_columns: Vec::new(),
        options: IndexOptions::default(),
    };
    parse_index_tail(base, &mut index)?;
    Some(index)
}

/// Parse trailing INCLUDE / WHERE / WITH / ON clauses of an index.
pub(crate) fn parse_index_tail(base: &mut TokenParser<'_>, index: &mut IndexDefinition) -> Option<()> {
    loop {
        base.skip_trivia();
        if base.is_at_end() || base.check_punct(";") {
            return Some(());
        }

        if base.expect_word_ci("INCLUDE").is_some() {
            index.included_columns = parse_column_list(base)?;
            continue;
        }

        if base.expect_word_ci("WITH").is_some() {
            index.options = parse_with_options(base)?;
            continue;
        }

        // WHERE filter, ON filegroup and anything else: skip to the next clause
        base.advance();
        base.skip_until(|t| t.is_word("WITH") || t.is_word("INCLUDE") || t.is_punct(";"));
    }
}

/// Parse optional CLUSTERED / NONCLUSTERED.
pub(crate) fn parse_clustering(base: &mut TokenParser<'_>) -> Option<bool> {
    if base.expect_word_ci("CLUSTERED").is_some() {
        Some(true)
    } else if base.expect_word_ci("NONCLUSTERED").is_some() {
        Some(false)
    } else {
        None
    }
}

/// Parse `([Col1] [ASC|DESC], [Col2], ...)`, returning the column names in
/// declaration order.
pub(crate) fn parse_column_list(base: &mut TokenParser<'_>) -> Option<Vec<String>> {
    base.expect_punct("(")?;

    let mut columns = Vec::new();
    loop {
        if base.expect_punct(")").is_some() {
            break;
        }

        columns.push(base.parse_identifier()?);
        base.skip_trivia();

        if base.expect_word_ci("ASC").is_none() {
            let _ = base.expect_word_ci("DESC");
        }

        if base.expect_punct(",").is_some() {
            continue;
        }
        base.expect_punct(")")?;
        break;
    }

    Some(columns)
}

/// Parse index options after `WITH`: either `(NAME = value, ...)` or the
/// legacy `FILLFACTOR = n` form.
pub(crate) fn parse_with_options(base: &mut TokenParser<'_>) -> Option<IndexOptions> {
    let mut options = IndexOptions::default();

    if base.expect_punct("(").is_none() {
        parse_option(base, &mut options)?;
        return Some(options);
    }

    loop {
        if base.is_at_end() {
            return None;
        }
        if base.expect_punct(")").is_some() {
            break;
        }
        parse_option(base, &mut options)?;
        base.skip_until(|t| t.is_punct(",") || t.is_punct(")"));
        let _ = base.expect_punct(",");
    }

    Some(options)
}

fn parse_option(base: &mut TokenParser<'_>, options: &mut IndexOptions) -> Option<()> {
    let token = base.current_token()?;
    if !matches!(token.kind, TokenKind::Identifier | TokenKind::Keyword) {
        return None;
    }
    let name = token.text.to_ascii_uppercase();
    base.advance();
    base.skip_trivia();
    base.expect_punct("=")?;

    let flag = if base.check_word_ci("ON") {
        Some(true)
    } else if base.check_word_ci("OFF") {
        Some(false)
    } else {
        None
    };
    let number = base
        .current_token()
        .filter(|t| t.kind == TokenKind::NumberLiteral)
        .and_then(|t| t.text.parse::<u32>().ok());

    match name.as_str() {
        "PAD_INDEX" => options.pad_index = flag,
        "FILLFACTOR" => options.fill_factor = number,
        "IGNORE_DUP_KEY" => options.ignore_dup_key = flag,
        "STATISTICS_NORECOMPUTE" => options.statistics_norecompute = flag,
        "ALLOW_ROW_LOCKS" => options.allow_row_locks = flag,
        "ALLOW_PAGE_LOCKS" => options.allow_page_locks = flag,
        _ => {}
    }

    base.advance();
    base.skip_trivia();
    Some(())
}
