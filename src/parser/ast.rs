//! Plain-data parse tree handed from the front end to the model builder.
//!
//! Nothing in here depends on how the SQL was tokenized or parsed; any front
//! end that can fill these structs can drive model extraction.

/// A one- or two-part object name as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObjectName {
    pub schema: Option<String>,
    pub name: String,
}

impl SchemaObjectName {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Schema, or `default_schema` when the name was unqualified
    pub fn schema_or<'a>(&'a self, default_schema: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default_schema)
    }
}

/// Statement kinds the model builder understands
#[derive(Debug, Clone, PartialEq)]
pub enum StatementNode {
    CreateTable(CreateTableNode),
    CreateIndex(CreateIndexNode),
    CreateProcedure(CreateRoutineNode),
    CreateFunction(CreateRoutineNode),
    CreateView(CreateRoutineNode),
    CreateTrigger(CreateRoutineNode),
    CreateXmlSchemaCollection(CreateRoutineNode),
    CreateSynonym(CreateSynonymNode),
    CreateUser(CreateUserNode),
    CreateLogin(CreateLoginNode),
    Execute(ExecuteNode),
    SetOptions(SetOptionsNode),
    AlterDatabaseSet(AlterDatabaseSetNode),
    AlterRoleMembership(AlterRoleMembershipNode),
    /// Anything else; carried along so callers can see what was skipped
    Other,
}

impl StatementNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            StatementNode::CreateTable(_) => "CREATE TABLE",
            StatementNode::CreateIndex(_) => "CREATE INDEX",
            StatementNode::CreateProcedure(_) => "CREATE PROCEDURE",
            StatementNode::CreateFunction(_) => "CREATE FUNCTION",
            StatementNode::CreateView(_) => "CREATE VIEW",
            StatementNode::CreateTrigger(_) => "CREATE TRIGGER",
            StatementNode::CreateXmlSchemaCollection(_) => "CREATE XML SCHEMA COLLECTION",
            StatementNode::CreateSynonym(_) => "CREATE SYNONYM",
            StatementNode::CreateUser(_) => "CREATE USER",
            StatementNode::CreateLogin(_) => "CREATE LOGIN",
            StatementNode::Execute(_) => "EXECUTE",
            StatementNode::SetOptions(_) => "SET",
            StatementNode::AlterDatabaseSet(_) => "ALTER DATABASE",
            StatementNode::AlterRoleMembership(_) => "ALTER ROLE",
            StatementNode::Other => "OTHER",
        }
    }
}

/// CREATE PROCEDURE / FUNCTION / VIEW / TRIGGER / XML SCHEMA COLLECTION
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRoutineNode {
    pub name: SchemaObjectName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableNode {
    pub name: SchemaObjectName,
    pub columns: Vec<ColumnDefinition>,
    pub constraints: Vec<TableConstraint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// `None` for computed columns
    pub data_type: Option<DataTypeReference>,
    /// `Some(false)` for explicit NOT NULL, `Some(true)` for explicit NULL
    pub nullability: Option<bool>,
    pub default: Option<DefaultConstraintDefinition>,
    pub computed_expression: Option<String>,
    pub is_persisted: bool,
    pub identity: Option<IdentityOptions>,
    pub is_rowguidcol: bool,
    /// Inline PRIMARY KEY / UNIQUE declared on the column itself
    pub constraints: Vec<UniqueConstraintDefinition>,
}

/// The type written for a column
#[derive(Debug, Clone, PartialEq)]
pub enum DataTypeReference {
    /// Built-in SQL Server type with its raw parameters (`50`, `MAX`, `18`, ...)
    Sql {
        name: String,
        parameters: Vec<String>,
    },
    /// Alias/CLR type such as `dbo.Phone` or `hierarchyid`
    UserDefined(SchemaObjectName),
    /// `xml`, optionally typed by a schema collection
    Xml {
        schema_collection: Option<SchemaObjectName>,
    },
}

impl DataTypeReference {
    /// Type name as written, for diagnostics
    pub fn display_name(&self) -> String {
        match self {
            DataTypeReference::Sql { name, parameters } if parameters.is_empty() => name.clone(),
            DataTypeReference::Sql { name, parameters } => {
                format!("{}({})", name, parameters.join(", "))
            }
            DataTypeReference::UserDefined(name) => match &name.schema {
                Some(schema) => format!("{}.{}", schema, name.name),
                None => name.name.clone(),
            },
            DataTypeReference::Xml { .. } => "xml".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultConstraintDefinition {
    pub name: Option<String>,
    pub expression: String,
}

/// IDENTITY [(seed, increment)], raw literal text
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityOptions {
    pub seed: Option<String>,
    pub increment: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    Unique(UniqueConstraintDefinition),
    /// Inline `INDEX name ... (cols)` table element
    Index(IndexDefinition),
    /// CHECK / FOREIGN KEY: recognized, not modelled
    Other {
        name: Option<String>,
        kind: &'static str,
    },
}

/// PRIMARY KEY or UNIQUE constraint
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueConstraintDefinition {
    pub name: Option<String>,
    pub is_primary_key: bool,
    pub clustered: Option<bool>,
    pub columns: Vec<String>,
    pub options: IndexOptions,
}

/// Options from a `WITH (...)` clause; `None` means not written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOptions {
    pub pad_index: Option<bool>,
    pub fill_factor: Option<u32>,
    pub ignore_dup_key: Option<bool>,
    pub statistics_norecompute: Option<bool>,
    pub allow_row_locks: Option<bool>,
    pub allow_page_locks: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    pub unique: bool,
    pub clustered: Option<bool>,
    pub columns: Vec<String>,
    pub included_columns: Vec<String>,
    pub options: IndexOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexNode {
    pub table: SchemaObjectName,
    pub index: IndexDefinition,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSynonymNode {
    pub name: SchemaObjectName,
    /// Target object reference as written after FOR
    pub for_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateUserNode {
    pub name: String,
    pub login: Option<String>,
    pub without_login: bool,
    pub default_schema: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateLoginNode {
    pub name: String,
    pub source: LoginSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginSource {
    Password { password: LiteralValue, hashed: bool },
    Windows,
    Other,
}

/// A literal or bare word used as a value
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Unescaped string value
    String(String),
    /// Raw binary literal text, e.g. `0x01AB`
    Binary(String),
    Number(String),
    Identifier(String),
    Other(String),
}

impl LiteralValue {
    /// Text usable as a name: string literal values and bare identifiers
    pub fn as_name(&self) -> Option<&str> {
        match self {
            LiteralValue::String(s) | LiteralValue::Identifier(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteNode {
    pub procedure: SchemaObjectName,
    pub parameters: Vec<ExecuteParameter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteParameter {
    /// Parameter name without `@` for `@name = value` arguments
    pub variable: Option<String>,
    pub value: LiteralValue,
}

/// SET QUOTED_IDENTIFIER / ANSI_NULLS / ... ON|OFF
#[derive(Debug, Clone, PartialEq)]
pub struct SetOptionsNode {
    /// Upper-cased option names
    pub options: Vec<String>,
    pub on: bool,
}

/// ALTER DATABASE <db> SET <option> ON|OFF
#[derive(Debug, Clone, PartialEq)]
pub struct AlterDatabaseSetNode {
    pub database: String,
    pub option: String,
    pub on: bool,
}

/// ALTER ROLE <role> ADD|DROP MEMBER <member>
#[derive(Debug, Clone, PartialEq)]
pub struct AlterRoleMembershipNode {
    pub role: String,
    pub member: String,
    pub is_add: bool,
}
