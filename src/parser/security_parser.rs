//! Token-based parser for security and procedure-call statements
//! (CREATE USER, CREATE LOGIN, ALTER ROLE ADD/DROP MEMBER, EXEC[UTE]).

use super::ast::{
    AlterRoleMembershipNode, CreateLoginNode, CreateUserNode, ExecuteNode, ExecuteParameter,
    LiteralValue, LoginSource,
};
use super::identifier_utils::{normalize_identifier, string_literal_value};
use super::token::{SqlToken, TokenKind};
use super::token_parser_base::TokenParser;

/// Token-based security statement parser
pub struct SecurityTokenParser<'a> {
    base: TokenParser<'a>,
}

impl<'a> SecurityTokenParser<'a> {
    pub fn new(tokens: &'a [SqlToken]) -> Self {
        Self {
            base: TokenParser::new(tokens),
        }
    }

    /// Parse CREATE USER [name] with its login and default schema options
    pub fn parse_create_user(&mut self) -> Option<CreateUserNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("CREATE")?;
        self.base.expect_word_ci("USER")?;

        let name = self.base.parse_identifier()?;
        self.base.skip_trivia();

        let mut user = CreateUserNode {
            name,
            login: None,
            without_login: false,
            default_schema: None,
        };

        loop {
            self.base.skip_trivia();
            if self.base.is_at_end() || self.base.check_punct(";") {
                break;
            }

            // FOR|FROM LOGIN [login_name]
            if self.base.expect_word_ci("FOR").is_some() || self.base.expect_word_ci("FROM").is_some()
            {
                if self.base.expect_word_ci("LOGIN").is_some() {
                    user.login = Some(self.base.parse_identifier()?);
                }
                continue;
            }

            if self.base.expect_word_ci("WITHOUT").is_some() {
                self.base.expect_word_ci("LOGIN")?;
                user.without_login = true;
                continue;
            }

            // WITH DEFAULT_SCHEMA = [schema], other options ignored
            if self.base.expect_word_ci("WITH").is_some() || self.base.expect_punct(",").is_some() {
                if self.base.expect_word_ci("DEFAULT_SCHEMA").is_some() {
                    self.base.expect_punct("=")?;
                    user.default_schema = Some(self.base.parse_identifier()?);
                }
                continue;
            }

            // Skip unknown tokens
            self.base.advance();
        }

        Some(user)
    }

    /// Parse CREATE LOGIN [name] { WITH PASSWORD = ... [HASHED] | FROM WINDOWS | FROM ... }
    pub fn parse_create_login(&mut self) -> Option<CreateLoginNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("CREATE")?;
        self.base.expect_word_ci("LOGIN")?;

        let name = self.base.parse_identifier()?;
        self.base.skip_trivia();

        if self.base.expect_word_ci("FROM").is_some() {
            let source = if self.base.check_word_ci("WINDOWS") {
                LoginSource::Windows
            } else {
                LoginSource::Other
            };
            return Some(CreateLoginNode { name, source });
        }

        self.base.expect_word_ci("WITH")?;
        self.base.expect_word_ci("PASSWORD")?;
        self.base.expect_punct("=")?;
        let password = parse_literal(&mut self.base)?;
        self.base.skip_trivia();
        let hashed = self.base.check_word_ci("HASHED");

        Some(CreateLoginNode {
            name,
            source: LoginSource::Password { password, hashed },
        })
    }

    /// Parse ALTER ROLE [role] ADD MEMBER [member] or DROP MEMBER [member]
    pub fn parse_alter_role_membership(&mut self) -> Option<AlterRoleMembershipNode> {
        self.base.skip_trivia();
        self.base.expect_word_ci("ALTER")?;
        self.base.expect_word_ci("ROLE")?;

        let role = self.base.parse_identifier()?;
        self.base.skip_trivia();

        let is_add = if self.base.expect_word_ci("ADD").is_some() {
            true
        } else {
            self.base.expect_word_ci("DROP")?;
            false
        };
        self.base.expect_word_ci("MEMBER")?;
        let member = self.base.parse_identifier()?;

        Some(AlterRoleMembershipNode {
            role,
            member,
            is_add,
        })
    }

    /// Parse EXEC[UTE] [@rc =] procedure [[@name =] value [OUTPUT], ...]
    pub fn parse_execute(&mut self) -> Option<ExecuteNode> {
        self.base.skip_trivia();
        if self.base.expect_word_ci("EXEC").is_none() {
            self.base.expect_word_ci("EXECUTE")?;
        }

        // Return status assignment
        if self.base.check_kind(TokenKind::Variable) {
            self.base.advance();
            self.base.skip_trivia();
            self.base.expect_punct("=")?;
        }

        let procedure = self.base.parse_schema_object_name()?;

        let mut parameters = Vec::new();
        loop {
            self.base.skip_trivia();
            if self.base.is_at_end() || self.base.check_punct(";") {
                break;
            }

            let variable = self.parse_parameter_name();
            let value = parse_literal(&mut self.base)?;
            parameters.push(ExecuteParameter { variable, value });

            self.base.skip_trivia();
            if self.base.expect_word_ci("OUTPUT").is_none() {
                let _ = self.base.expect_word_ci("OUT");
            }
            if self.base.expect_punct(",").is_none() {
                break;
            }
        }

        Some(ExecuteNode {
            procedure,
            parameters,
        })
    }

    /// `@name =` prefix of a named argument, without the `@`
    fn parse_parameter_name(&mut self) -> Option<String> {
        let token = self.base.current_token()?;
        if token.kind != TokenKind::Variable {
            return None;
        }

        let checkpoint = self.base.pos();
        self.base.advance();
        self.base.skip_trivia();
        if self.base.expect_punct("=").is_some() {
            Some(token.text.trim_start_matches('@').to_string())
        } else {
            // A variable passed as a positional value
            self.base.set_pos(checkpoint);
            None
        }
    }
}

/// Parse a literal or bare word used as a value.
pub(crate) fn parse_literal(base: &mut TokenParser<'_>) -> Option<LiteralValue> {
    if let Some(number) = base.parse_signed_number_text() {
        return Some(LiteralValue::Number(number));
    }

    let token = base.current_token()?;
    let value = match token.kind {
        TokenKind::StringLiteral => {
            LiteralValue::String(string_literal_value(&token.text).unwrap_or_default())
        }
        TokenKind::BinaryLiteral => LiteralValue::Binary(token.text.clone()),
        TokenKind::Identifier | TokenKind::QuotedIdentifier => {
            LiteralValue::Identifier(normalize_identifier(&token.text))
        }
        TokenKind::Keyword | TokenKind::Variable => LiteralValue::Other(token.text.clone()),
        _ => return None,
    };
    base.advance();
    Some(value)
}

/// Top-level convenience function to parse CREATE USER
pub fn parse_create_user_tokens(tokens: &[SqlToken]) -> Option<CreateUserNode> {
    SecurityTokenParser::new(tokens).parse_create_user()
}

/// Top-level convenience function to parse CREATE LOGIN
pub fn parse_create_login_tokens(tokens: &[SqlToken]) -> Option<CreateLoginNode> {
    SecurityTokenParser::new(tokens).parse_create_login()
}

/// Top-level convenience function to parse ALTER ROLE ... ADD/DROP MEMBER
pub fn parse_alter_role_membership_tokens(tokens: &[SqlToken]) -> Option<AlterRoleMembershipNode> {
    SecurityTokenParser::new(tokens).parse_alter_role_membership()
}

/// Top-level convenience function to parse EXEC[UTE]
pub fn parse_execute_tokens(tokens: &[SqlToken]) -> Option<ExecuteNode> {
    SecurityTokenParser::new(tokens).parse_execute()
}
