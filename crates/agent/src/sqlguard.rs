//! Deterministic statement guard.
//!
//! The safety rules sent to the completion backend are repeated here as
//! checks the backend cannot talk its way around: one statement, read/write
//! verbs only, no schema mutation, and only the known application tables.
//! This is a keyword-level guard, not a SQL parser; a statement it passes
//! can still be rejected by the store.

use thiserror::Error;

const ALLOWED_LEADING_KEYWORDS: [&str; 4] = ["SELECT", "INSERT", "UPDATE", "WITH"];

const FORBIDDEN_KEYWORDS: [&str; 7] =
    ["DROP", "ALTER", "DELETE", "TRUNCATE", "CREATE", "GRANT", "REVOKE"];

/// Application tables a generated statement may reference.
const TABLE_ALLOWLIST: [&str; 15] = [
    "profiles_talentops",
    "tasks_talentops",
    "leaves_talentops",
    "attendance_talentops",
    "payroll_talentops",
    "payslips_talentops",
    "performance_reviews_talentops",
    "expenses_talentops",
    "notifications_talentops",
    "timesheets_talentops",
    "projects_talentops",
    "teams_talentops",
    "departments_talentops",
    "announcements_talentops",
    "policies_talentops",
];

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StatementViolation {
    #[error("statement must start with SELECT, INSERT, UPDATE, or WITH")]
    DisallowedVerb,
    #[error("multiple statements are not allowed")]
    MultipleStatements,
    #[error("forbidden keyword `{0}`")]
    ForbiddenKeyword(&'static str),
    #[error("table `{0}` is not an application table")]
    UnknownTable(String),
}

pub fn check_statement(sql: &str) -> Result<(), StatementViolation> {
    let trimmed = sql.trim();

    let tokens: Vec<&str> = trimmed
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .collect();

    let leading_ok = tokens
        .first()
        .is_some_and(|first| ALLOWED_LEADING_KEYWORDS.iter().any(|kw| first.eq_ignore_ascii_case(kw)));
    if !leading_ok {
        return Err(StatementViolation::DisallowedVerb);
    }

    // One trailing semicolon is tolerated; any interior one means a second
    // statement (semicolons inside literals are rejected too, and the
    // generation rules never produce them).
    let body = trimmed.trim_end_matches(|c: char| c.is_whitespace() || c == ';');
    if body.contains(';') {
        return Err(StatementViolation::MultipleStatements);
    }

    for token in &tokens {
        if let Some(keyword) =
            FORBIDDEN_KEYWORDS.iter().copied().find(|keyword| token.eq_ignore_ascii_case(keyword))
        {
            return Err(StatementViolation::ForbiddenKeyword(keyword));
        }
    }

    for token in &tokens {
        let lowered = token.to_ascii_lowercase();
        if lowered.ends_with("_talentops") && !TABLE_ALLOWLIST.contains(&lowered.as_str()) {
            return Err(StatementViolation::UnknownTable(lowered));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check_statement, StatementViolation};
    use crate::outcome::FALLBACK_REPLY;

    #[test]
    fn plain_select_passes() {
        assert_eq!(check_statement("SELECT * FROM tasks_talentops WHERE status = 'pending'"), Ok(()));
    }

    #[test]
    fn trailing_semicolon_is_tolerated() {
        assert_eq!(check_statement("SELECT id FROM leaves_talentops;"), Ok(()));
    }

    #[test]
    fn cte_insert_passes() {
        let sql = "WITH assignee AS (SELECT id FROM profiles_talentops WHERE email = 'a@x.com') \
                   INSERT INTO tasks_talentops (title, assigned_to) SELECT 'Task', id FROM assignee";
        assert_eq!(check_statement(sql), Ok(()));
    }

    #[test]
    fn ddl_is_rejected_wherever_it_appears() {
        assert_eq!(
            check_statement("DROP TABLE tasks_talentops"),
            Err(StatementViolation::DisallowedVerb)
        );
        assert_eq!(
            check_statement("SELECT 1 FROM tasks_talentops WHERE x = (DROP TABLE y)"),
            Err(StatementViolation::ForbiddenKeyword("DROP"))
        );
        assert_eq!(
            check_statement("update tasks_talentops set title = 'x' where id in (delete from y)"),
            Err(StatementViolation::ForbiddenKeyword("DELETE"))
        );
    }

    #[test]
    fn multiple_statements_are_rejected() {
        assert_eq!(
            check_statement("SELECT 1; DROP TABLE tasks_talentops"),
            Err(StatementViolation::MultipleStatements)
        );
    }

    #[test]
    fn off_allowlist_application_table_is_rejected() {
        assert_eq!(
            check_statement("SELECT * FROM secrets_talentops"),
            Err(StatementViolation::UnknownTable("secrets_talentops".to_string()))
        );
    }

    #[test]
    fn keyword_substrings_inside_identifiers_do_not_trip_the_guard() {
        assert_eq!(
            check_statement("SELECT undeleted, created_at FROM tasks_talentops"),
            Ok(())
        );
    }

    #[test]
    fn backend_fallback_text_is_rejected() {
        assert_eq!(check_statement(FALLBACK_REPLY), Err(StatementViolation::DisallowedVerb));
    }
}
