//! T-SQL parsing

pub mod ast;
mod column_parser;
mod constraint_parser;
pub mod identifier_utils;
mod index_parser;
mod routine_parser;
mod security_parser;
mod statement_parser;
mod synonym_parser;
mod table_parser;
pub mod token;
mod token_parser_base;
mod tsql_parser;

pub use token::{tokenize, tokens_text, SqlToken, TokenKind};
pub use tsql_parser::{parse_sql, parse_sql_file, ParsedBatch, ParsedScript, ParsedStatement};
