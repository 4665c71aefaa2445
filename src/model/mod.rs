//! Database object model and script generation

mod builder;
mod constraint;
mod database_model;
mod elements;
mod routine;
mod session_options;
mod sql_user;

pub use builder::{build_model, ModelVisitor};
pub use constraint::{Constraint, ConstraintType};
pub use database_model::{Database, DbProp, DEFAULT_SCHEMA};
pub use elements::{Column, ColumnDefault, Identity, Synonym, Table};
pub use routine::{create_to_alter, normalize_name_tokens, Routine, RoutineKind, RoutineWarning};
pub use session_options::{wrap_with_session_options, SessionOption};
pub use sql_user::SqlUser;
