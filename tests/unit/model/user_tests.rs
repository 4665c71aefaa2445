//! User and Login Tests

use pretty_assertions::assert_eq;
use rust_sqlscripter::model::SqlUser;
use rust_sqlscripter::ScriptError;
use rust_sqlscripter::{extract_database_from_str, ExtractOptions};

use super::extract;

// ============================================================================
// Script Tests
// ============================================================================

#[test]
fn test_user_without_login() {
    let user = SqlUser::new("reporter", Some("dbo"));
    assert_eq!(user.script_create(), "CREATE USER [reporter] WITHOUT LOGIN");
}

#[test]
fn test_user_with_hashed_login_and_roles() {
    let mut user = SqlUser::new("app", Some("dbo"));
    user.password_hash = Some(vec![0x01, 0x00, 0xAB]);
    user.database_roles.insert("db_owner".to_string());
    user.database_roles.insert("db_datareader".to_string());

    assert_eq!(
        user.script_create(),
        "IF SUSER_ID('app') IS NULL\n\
         \tBEGIN CREATE LOGIN [app] WITH PASSWORD = 0x0100AB HASHED END\n\
         CREATE USER [app] FOR LOGIN [app]\n\
         /*ALTER ROLE [db_datareader] ADD MEMBER [app]*/ exec sp_addrolemember 'db_datareader', 'app'\n\
         /*ALTER ROLE [db_owner] ADD MEMBER [app]*/ exec sp_addrolemember 'db_owner', 'app'"
    );
}

#[test]
fn test_drop_leaves_login() {
    let mut user = SqlUser::new("app", None);
    user.password_hash = Some(vec![0xFF]);
    assert_eq!(user.script_drop(), "DROP USER [app]");
}

#[test]
fn test_assign_default_schema() {
    assert_eq!(
        SqlUser::new("app", Some("sales")).script_assign_default_schema(),
        "ALTER USER [app] WITH DEFAULT_SCHEMA = [sales]"
    );
    assert_eq!(SqlUser::new("app", None).script_assign_default_schema(), "");
}

// ============================================================================
// Extraction Tests
// ============================================================================

#[test]
fn test_create_user_default_schema() {
    let db = extract(
        "CREATE USER [alice] WITHOUT LOGIN\nGO\nCREATE USER bob FOR LOGIN bob WITH DEFAULT_SCHEMA = sales\nGO\n",
    );
    assert_eq!(db.find_user("alice").unwrap().default_schema.as_deref(), Some("dbo"));
    assert_eq!(db.find_user("bob").unwrap().default_schema.as_deref(), Some("sales"));
}

#[test]
fn test_create_login_decodes_hashed_password() {
    let db = extract(
        "CREATE LOGIN [app] WITH PASSWORD = 0x0200ABCD HASHED, CHECK_POLICY = OFF\nGO\nCREATE USER [app] FOR LOGIN [app]\nGO\n",
    );
    let user = db.find_user("app").unwrap();
    assert_eq!(user.password_hash, Some(vec![0x02, 0x00, 0xAB, 0xCD]));
    assert!(user.script_create().contains("WITH PASSWORD = 0x0200ABCD HASHED"));
}

#[test]
fn test_create_login_with_plain_password_keeps_no_hash() {
    let db = extract("CREATE LOGIN [app] WITH PASSWORD = 'secret'\nGO\n");
    assert_eq!(db.find_user("app").unwrap().password_hash, None);
}

#[test]
fn test_add_role_member_positional() {
    let db = extract(
        "CREATE USER [app] WITHOUT LOGIN\nGO\nEXEC sp_addrolemember 'db_owner', 'app'\nGO\nEXEC sp_addrolemember N'db_datareader', N'app'\nGO\n",
    );
    let roles: Vec<&str> = db
        .find_user("app")
        .unwrap()
        .database_roles
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(roles, vec!["db_datareader", "db_owner"]);
}

#[test]
fn test_add_role_member_named_parameters() {
    let db = extract(
        "CREATE USER [app] WITHOUT LOGIN\nGO\nEXECUTE dbo.sp_addrolemember @membername = N'app', @rolename = N'db_owner'\nGO\n",
    );
    assert!(db.find_user("app").unwrap().database_roles.contains("db_owner"));
}

#[test]
fn test_alter_role_membership() {
    let db = extract(
        "CREATE USER [app] WITHOUT LOGIN\nGO\nALTER ROLE [db_owner] ADD MEMBER [app]\nGO\nALTER ROLE db_datareader ADD MEMBER App\nALTER ROLE [db_owner] DROP MEMBER [app];\nGO\n",
    );
    let user = db.find_user("app").unwrap();
    let roles: Vec<&str> = user.database_roles.iter().map(String::as_str).collect();
    assert_eq!(roles, vec!["db_datareader"]);
    assert!(user
        .script_create()
        .ends_with("exec sp_addrolemember 'db_datareader', 'app'"));
}

#[test]
fn test_alter_role_unknown_member_fails() {
    let err = extract_database_from_str(
        "ALTER ROLE [db_owner] ADD MEMBER [ghost]",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ScriptError::UserNotFound { ref user, .. } if user == "ghost"));
}

#[test]
fn test_add_role_member_unknown_user_fails() {
    let err = extract_database_from_str(
        "EXEC sp_addrolemember 'db_owner', 'ghost'",
        &ExtractOptions::default(),
    )
    .unwrap_err();
    match err {
        ScriptError::UserNotFound { user, role } => {
            assert_eq!(user, "ghost");
            assert_eq!(role, "db_owner");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_other_procedure_calls_are_ignored() {
    let db = extract("EXEC dbo.DoWork 'db_owner', 'ghost'");
    assert_eq!(db.users().count(), 0);
}
