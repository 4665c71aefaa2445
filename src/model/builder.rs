//! Build the database model from parsed SQL statements
//!
//! [`ModelVisitor`] walks a [`ParsedScript`] statement by statement and
//! populates a [`Database`]. Besides the CREATE statements that become model
//! objects it observes a few statements that only change extraction state:
//! `SET QUOTED_IDENTIFIER|ANSI_NULLS` (captured by routines created later),
//! `ALTER DATABASE ... SET` (database-wide defaults), and
//! `EXEC sp_addrolemember` / `ALTER ROLE ... ADD|DROP MEMBER` (role membership
//! of known users).

use tracing::{debug, trace, warn};

use crate::error::{Result, ScriptError};
use crate::parser::ast::{
    AlterRoleMembershipNode, ColumnDefinition, CreateIndexNode, CreateLoginNode, CreateRoutineNode, CreateSynonymNode,
    CreateTableNode, CreateUserNode, DataTypeReference, ExecuteNode, ExecuteParameter,
    IdentityOptions, IndexDefinition, IndexOptions, LiteralValue, LoginSource, StatementNode,
    TableConstraint, UniqueConstraintDefinition,
};
use crate::parser::{ParsedBatch, ParsedScript, ParsedStatement};

use super::{
    Column, ColumnDefault, Constraint, ConstraintType, Database, Identity, Routine, RoutineKind,
    SessionOption, Synonym, Table,
};

const ADD_ROLE_MEMBER_PROC: &str = "sp_addrolemember";

/// Build a database model from a parsed script
pub fn build_model(script: &ParsedScript, db: Database) -> Result<Database> {
    let mut visitor = ModelVisitor::new(db);
    visitor.visit_script(script)?;
    Ok(visitor.into_database())
}

/// Single-pass walker that extracts model objects into a [`Database`]
pub struct ModelVisitor {
    db: Database,
    quoted_identifier: bool,
    ansi_nulls: bool,
    verbose: bool,
}

impl ModelVisitor {
    /// Session options start ON, the SQL Server client default.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            quoted_identifier: true,
            ansi_nulls: true,
            verbose: false,
        }
    }

    /// Report statements that are skipped without being modelled
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn into_database(self) -> Database {
        self.db
    }

    pub fn visit_script(&mut self, script: &ParsedScript) -> Result<()> {
        for (batch, statement) in script.statements() {
            self.visit_statement(batch, statement)?;
        }
        Ok(())
    }

    pub fn visit_statement(&mut self, batch: &ParsedBatch, statement: &ParsedStatement) -> Result<()> {
        let line = batch.line_of(statement);
        trace!(line, kind = statement.node.kind_name(), "visiting statement");

        match &statement.node {
            StatementNode::CreateTable(node) => self.visit_create_table(node),
            StatementNode::CreateIndex(node) => self.visit_create_index(node, line),
            StatementNode::CreateProcedure(node) => {
                self.visit_routine(RoutineKind::Procedure, node, batch, statement)
            }
            StatementNode::CreateFunction(node) => {
                self.visit_routine(RoutineKind::Function, node, batch, statement)
            }
            StatementNode::CreateView(node) => {
                self.visit_routine(RoutineKind::View, node, batch, statement)
            }
            StatementNode::CreateTrigger(node) => {
                self.visit_routine(RoutineKind::Trigger, node, batch, statement)
            }
            StatementNode::CreateXmlSchemaCollection(node) => {
                self.visit_routine(RoutineKind::XmlSchemaCollection, node, batch, statement)
            }
            StatementNode::CreateSynonym(node) => self.visit_create_synonym(node),
            StatementNode::CreateUser(node) => {
                self.visit_create_user(node);
                Ok(())
            }
            StatementNode::CreateLogin(node) => self.visit_create_login(node),
            StatementNode::Execute(node) => self.visit_execute(node, line),
            StatementNode::AlterRoleMembership(node) => self.visit_alter_role(node),
            StatementNode::SetOptions(node) => {
                for option in &node.options {
                    self.set_session_option(option, node.on);
                }
                Ok(())
            }
            StatementNode::AlterDatabaseSet(node) => {
                let value = if node.on { "ON" } else { "OFF" };
                debug!(option = %node.option, value, "database option");
                self.db.set_prop(&node.option, value);
                Ok(())
            }
            StatementNode::Other => {
                if self.verbose {
                    let text = batch.statement_text(statement);
                    let first_line = text.trim().lines().next().unwrap_or_default();
                    warn!(line, statement = first_line, "statement not modelled, skipping");
                }
                Ok(())
            }
        }
    }

    fn set_session_option(&mut self, option: &str, on: bool) {
        match SessionOption::from_name(option) {
            Some(SessionOption::QuotedIdentifier) => self.quoted_identifier = on,
            Some(SessionOption::AnsiNulls) => self.ansi_nulls = on,
            None => trace!(option, "ignoring session option"),
        }
    }

    // ========================================================================
    // Tables
    // ========================================================================

    fn visit_create_table(&mut self, node: &CreateTableNode) -> Result<()> {
        let schema = node.name.schema_or(&self.db.default_schema).to_string();
        let mut table = Table::new(&schema, &node.name.name);

        for definition in &node.columns {
            let column = build_column(&table, definition)?;
            for unique in &definition.constraints {
                let constraint = unique_constraint(&table, unique, Some(&definition.name))?;
                table.constraints.push(constraint);
            }
            table.add_column(column);
        }

        for element in &node.constraints {
            match element {
                TableConstraint::Unique(unique) => {
                    let constraint = unique_constraint(&table, unique, None)?;
                    table.constraints.push(constraint);
                }
                TableConstraint::Index(index) => {
                    let constraint = index_constraint(&table, index)?;
                    table.constraints.push(constraint);
                }
                TableConstraint::Other { name, kind } => {
                    trace!(table = %table.name, constraint = ?name, kind, "constraint not modelled");
                }
            }
        }

        debug!(
            schema = %table.schema,
            name = %table.name,
            columns = table.columns.len(),
            constraints = table.constraints.len(),
            "extracted table"
        );
        self.db.add_table(table)
    }

    fn visit_create_index(&mut self, node: &CreateIndexNode, line: usize) -> Result<()> {
        let schema = node.table.schema_or(&self.db.default_schema).to_string();
        let Some(table) = self.db.find_table_mut(&schema, &node.table.name) else {
            return Err(ScriptError::MalformedStatement {
                statement: "CREATE INDEX",
                line,
                message: format!(
                    "table [{}].[{}] for index [{}] not found",
                    schema, node.table.name, node.index.name
                ),
            });
        };

        let constraint = index_constraint(table, &node.index)?;
        debug!(table = %table.name, index = %constraint.name, "extracted index");
        table.constraints.push(constraint);
        Ok(())
    }

    // ========================================================================
    // Routines and synonyms
    // ========================================================================

    fn visit_routine(
        &mut self,
        kind: RoutineKind,
        node: &CreateRoutineNode,
        batch: &ParsedBatch,
        statement: &ParsedStatement,
    ) -> Result<()> {
        let schema = node.name.schema_or(&self.db.default_schema).to_string();
        let tokens = batch.statement_tokens(statement).to_vec();

        let mut routine = Routine::from_tokens(&schema, &node.name.name, kind, tokens);
        routine.quoted_identifier = self.quoted_identifier;
        routine.ansi_nulls = self.ansi_nulls;

        debug!(
            kind = %routine.kind,
            schema = %routine.schema,
            name = %routine.name,
            quoted_identifier = routine.quoted_identifier,
            ansi_nulls = routine.ansi_nulls,
            "extracted routine"
        );
        if self.verbose {
            for warning in routine.warnings() {
                warn!(schema = %routine.schema, name = %routine.name, "{}", warning);
            }
        }
        self.db.add_routine(routine)
    }

    fn visit_create_synonym(&mut self, node: &CreateSynonymNode) -> Result<()> {
        let schema = node.name.schema_or(&self.db.default_schema).to_string();
        let synonym = Synonym::new(&schema, &node.name.name, &node.for_name);
        debug!(schema = %synonym.schema, name = %synonym.name, target = %synonym.base_object_name, "extracted synonym");
        self.db.add_synonym(synonym)
    }

    // ========================================================================
    // Users, logins and roles
    // ========================================================================

    fn visit_create_user(&mut self, node: &CreateUserNode) {
        let default_schema = node
            .default_schema
            .clone()
            .unwrap_or_else(|| self.db.default_schema.clone());
        let user = self.db.find_or_create_user(&node.name, &default_schema);
        user.default_schema = Some(default_schema);
        debug!(user = %user.name, "extracted user");
    }

    fn visit_create_login(&mut self, node: &CreateLoginNode) -> Result<()> {
        let default_schema = self.db.default_schema.clone();
        let user = self.db.find_or_create_user(&node.name, &default_schema);

        if let LoginSource::Password {
            password,
            hashed: true,
        } = &node.source
        {
            let LiteralValue::Binary(text) = password else {
                return Err(ScriptError::InvalidLiteral {
                    context: format!("hashed password of login [{}]", node.name),
                    value: format!("{:?}", password),
                });
            };
            user.password_hash = Some(decode_hex_literal(text, &node.name)?);
        }

        debug!(login = %user.name, hashed = user.password_hash.is_some(), "extracted login");
        Ok(())
    }

    fn visit_execute(&mut self, node: &ExecuteNode, line: usize) -> Result<()> {
        if !node.procedure.name.eq_ignore_ascii_case(ADD_ROLE_MEMBER_PROC) {
            trace!(procedure = %node.procedure.name, "ignoring EXEC");
            return Ok(());
        }

        let positional = node.parameters.iter().any(|p| p.variable.is_none());
        let (role, member) = if positional {
            (node.parameters.first(), node.parameters.last())
        } else {
            (named_parameter(node, "rolename"), named_parameter(node, "membername"))
        };

        let (Some(role), Some(member)) = (role, member) else {
            return Err(ScriptError::MalformedStatement {
                statement: "EXECUTE",
                line,
                message: format!("{} needs a role and a member", ADD_ROLE_MEMBER_PROC),
            });
        };
        let role = literal_name(&role.value, "role name")?;
        let member = literal_name(&member.value, "member name")?;

        let Some(user) = self.db.find_user_mut(member) else {
            return Err(ScriptError::UserNotFound {
                user: member.to_string(),
                role: role.to_string(),
            });
        };
        user.database_roles.insert(role.to_string());
        debug!(user = %user.name, role, "added role member");
        Ok(())
    }

    fn visit_alter_role(&mut self, node: &AlterRoleMembershipNode) -> Result<()> {
        let Some(user) = self.db.find_user_mut(&node.member) else {
            return Err(ScriptError::UserNotFound {
                user: node.member.clone(),
                role: node.role.clone(),
            });
        };
        if node.is_add {
            user.database_roles.insert(node.role.clone());
            debug!(user = %user.name, role = %node.role, "added role member");
        } else {
            user.database_roles.remove(&node.role);
            debug!(user = %user.name, role = %node.role, "dropped role member");
        }
        Ok(())
    }
}

fn named_parameter<'a>(node: &'a ExecuteNode, name: &str) -> Option<&'a ExecuteParameter> {
    node.parameters
        .iter()
        .find(|p| p.variable.as_deref().is_some_and(|v| v.eq_ignore_ascii_case(name)))
}

fn literal_name<'a>(value: &'a LiteralValue, context: &str) -> Result<&'a str> {
    value.as_name().ok_or_else(|| ScriptError::InvalidLiteral {
        context: format!("{} for {}", context, ADD_ROLE_MEMBER_PROC),
        value: format!("{:?}", value),
    })
}

/// Decode a `0x...` literal; an odd digit count gets a leading zero.
fn decode_hex_literal(text: &str, login: &str) -> Result<Vec<u8>> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    let padded = if digits.len() % 2 == 1 {
        format!("0{}", digits)
    } else {
        digits.to_string()
    };
    hex::decode(padded).map_err(|e| ScriptError::InvalidLiteral {
        context: format!("password hash of login [{}] ({})", login, e),
        value: text.to_string(),
    })
}

// ============================================================================
// Columns
// ============================================================================

fn build_column(table: &Table, definition: &ColumnDefinition) -> Result<Column> {
    let is_nullable = definition.nullability != Some(false);

    let mut column = match (&definition.data_type, &definition.computed_expression) {
        (_, Some(expression)) => Column::computed(&definition.name, expression, definition.is_persisted),
        (Some(DataTypeReference::Sql { name, parameters }), None) => {
            let mut column = Column::new(&definition.name, name, is_nullable);
            apply_type_parameters(&mut column, parameters, table)?;
            column
        }
        (Some(other), None) => {
            return Err(unsupported_type(other.display_name(), table, &definition.name));
        }
        (None, None) => {
            return Err(unsupported_type(String::new(), table, &definition.name));
        }
    };
    column.is_nullable = is_nullable;
    column.is_rowguidcol = definition.is_rowguidcol;

    if let Some(identity) = &definition.identity {
        column.identity = Some(build_identity(identity, table, &definition.name)?);
    }

    if let Some(default) = &definition.default {
        let name = default
            .name
            .clone()
            .unwrap_or_else(|| format!("DF_{}_{}", table.name, definition.name));
        column.default = Some(ColumnDefault {
            name,
            expression: default.expression.clone(),
        });
    }

    Ok(column)
}

fn unsupported_type(type_name: String, table: &Table, column: &str) -> ScriptError {
    ScriptError::UnsupportedType {
        type_name,
        schema: table.schema.clone(),
        table: table.name.clone(),
        column: column.to_string(),
    }
}

/// `(n)` or `(MAX)` becomes a length, `(p, s)` a precision and scale.
fn apply_type_parameters(column: &mut Column, parameters: &[String], table: &Table) -> Result<()> {
    let numeric = |text: &str| !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit());
    let column_path = format!("[{}].[{}].[{}]", table.schema, table.name, column.name);
    let invalid = |text: &str| ScriptError::InvalidLiteral {
        context: format!("type parameter of column {}", column_path),
        value: text.to_string(),
    };

    match parameters {
        [] => {}
        [length] if length.eq_ignore_ascii_case("MAX") => column.length = Some(-1),
        [length] if numeric(length) => {
            column.length = Some(length.parse::<i32>().map_err(|_| invalid(length))?);
        }
        [precision, scale] if numeric(precision) && numeric(scale) => {
            column.precision = Some(precision.parse::<u8>().map_err(|_| invalid(precision))?);
            column.scale = Some(scale.parse::<u8>().map_err(|_| invalid(scale))?);
        }
        _ => {
            return Err(unsupported_type(
                format!("{}({})", column.type_name, parameters.join(", ")),
                table,
                &column.name,
            ));
        }
    }
    Ok(())
}

fn build_identity(identity: &IdentityOptions, table: &Table, column: &str) -> Result<Identity> {
    let parse = |value: &Option<String>, what: &str| -> Result<i64> {
        match value {
            None => Ok(1),
            Some(text) => text.trim().parse::<i64>().map_err(|_| ScriptError::InvalidLiteral {
                context: format!(
                    "identity {} of column [{}].[{}].[{}]",
                    what, table.schema, table.name, column
                ),
                value: text.clone(),
            }),
        }
    };

    Ok(Identity {
        seed: parse(&identity.seed, "seed")?,
        increment: parse(&identity.increment, "increment")?,
    })
}

// ============================================================================
// Constraints
// ============================================================================

/// PRIMARY KEY / UNIQUE. `column` is set for constraints declared inline on a
/// column, which key on that column when no list is given.
fn unique_constraint(
    table: &Table,
    definition: &UniqueConstraintDefinition,
    column: Option<&str>,
) -> Result<Constraint> {
    let columns = match (definition.columns.is_empty(), column) {
        (true, Some(column)) => vec![column.to_string()],
        _ => definition.columns.clone(),
    };

    let (constraint_type, name) = if definition.is_primary_key {
        (ConstraintType::PrimaryKey, format!("PK_{}", table.name))
    } else {
        let first = columns.first().map(String::as_str).unwrap_or_default();
        (ConstraintType::Unique, format!("UQ_{}_{}", table.name, first))
    };
    let name = definition.name.clone().unwrap_or(name);

    let mut constraint = Constraint::new(&name, constraint_type, &table.schema, &table.name, columns);
    constraint.clustered = definition.clustered.unwrap_or(false);
    constraint.unique = true;
    apply_index_options(&mut constraint, &definition.options)?;
    Ok(constraint)
}

fn index_constraint(table: &Table, definition: &IndexDefinition) -> Result<Constraint> {
    let mut constraint = Constraint::new(
        &definition.name,
        ConstraintType::Index,
        &table.schema,
        &table.name,
        definition.columns.clone(),
    );
    constraint.unique = definition.unique;
    constraint.clustered = definition.clustered.unwrap_or(false);
    constraint.included_columns = definition.included_columns.clone();
    apply_index_options(&mut constraint, &definition.options)?;
    Ok(constraint)
}

fn apply_index_options(constraint: &mut Constraint, options: &IndexOptions) -> Result<()> {
    if let Some(fill_factor) = options.fill_factor {
        constraint.fill_factor = u8::try_from(fill_factor)
            .ok()
            .filter(|f| *f <= 100)
            .ok_or_else(|| ScriptError::InvalidFillFactor {
                name: constraint.name.clone(),
                value: fill_factor,
            })?;
    }
    if let Some(value) = options.ignore_dup_key {
        constraint.ignore_dup_key = value;
    }
    if let Some(value) = options.pad_index {
        constraint.pad_index = value;
    }
    if let Some(value) = options.allow_row_locks {
        constraint.allow_row_locks = value;
    }
    if let Some(value) = options.allow_page_locks {
        constraint.allow_page_locks = value;
    }
    if let Some(value) = options.statistics_norecompute {
        constraint.statistics_norecompute = value;
    }
    Ok(())
}
