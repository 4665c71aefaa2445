//! SET QUOTED_IDENTIFIER / SET ANSI_NULLS wrapping for routine scripts
//!
//! SQL Server captures both options when a routine is created. A script that
//! recreates the routine must switch the session to the captured values
//! before the definition and restore the database defaults afterwards.

use super::Database;

/// Session options captured at routine creation, in script order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionOption {
    QuotedIdentifier,
    AnsiNulls,
}

impl SessionOption {
    pub const ALL: [SessionOption; 2] = [SessionOption::QuotedIdentifier, SessionOption::AnsiNulls];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionOption::QuotedIdentifier => "QUOTED_IDENTIFIER",
            SessionOption::AnsiNulls => "ANSI_NULLS",
        }
    }

    /// Parse an upper- or lower-case option name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str().eq_ignore_ascii_case(name))
    }

    /// The value a session starts with.
    ///
    /// A database property wins. Without one, the default is taken to be the
    /// opposite of what the routine needs, so the switch is always scripted.
    pub fn default_value(&self, required: bool, db: Option<&Database>) -> bool {
        db.and_then(|db| db.find_prop(self.as_str()))
            .map(|prop| prop.is_on())
            .unwrap_or(!required)
    }
}

/// `SET <option> ON|OFF` batches for every option whose chosen value
/// differs from its default. Each batch ends with a `GO` line.
fn set_blocks(required: &[(SessionOption, bool)], db: Option<&Database>, restore: bool) -> String {
    let mut script = String::new();
    for &(option, value) in required {
        let default = option.default_value(value, db);
        if value == default {
            continue;
        }
        let target = if restore { default } else { value };
        script.push_str(&format!(
            "SET {} {}\nGO\n",
            option.as_str(),
            if target { "ON" } else { "OFF" }
        ));
    }
    script
}

/// Surround `body` with the SET batches needed to reproduce `required`,
/// restoring the database defaults after the body.
pub fn wrap_with_session_options(
    body: &str,
    required: &[(SessionOption, bool)],
    db: Option<&Database>,
) -> String {
    let before = set_blocks(required, db, false);
    let after = set_blocks(required, db, true);

    let mut script = String::with_capacity(before.len() + body.len() + after.len() + 4);
    script.push_str(&before);
    script.push_str(body);
    if !after.is_empty() {
        script.push_str("\nGO\n");
        script.push_str(&after);
    }
    script
}
