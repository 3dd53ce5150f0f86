use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed role set recognized by the permission table. Anything outside this
/// set fails closed at the request edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Teamlead,
    Manager,
    Executive,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unsupported role `{0}` (expected employee|teamlead|manager|executive)")]
pub struct RoleParseError(pub String);

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "teamlead" => Ok(Self::Teamlead),
            "manager" => Ok(Self::Manager),
            "executive" => Ok(Self::Executive),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Teamlead => "teamlead",
            Self::Manager => "manager",
            Self::Executive => "executive",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Caller identity for a single chat request. Immutable once parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    pub team_id: Option<String>,
}

/// Wire-level chat request. `role` stays a raw string here; the dispatcher
/// parses it so that an unknown role produces a structured reply instead of
/// a deserialization failure.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub role: String,
    #[serde(default)]
    pub team_id: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::{Role, RoleParseError};

    #[test]
    fn parses_roles_case_insensitively() {
        assert_eq!("Employee".parse::<Role>(), Ok(Role::Employee));
        assert_eq!("TEAMLEAD".parse::<Role>(), Ok(Role::Teamlead));
        assert_eq!(" manager ".parse::<Role>(), Ok(Role::Manager));
        assert_eq!("executive".parse::<Role>(), Ok(Role::Executive));
    }

    #[test]
    fn rejects_unknown_role() {
        assert_eq!("intern".parse::<Role>(), Err(RoleParseError("intern".to_string())));
    }

    #[test]
    fn displays_lowercase_names() {
        assert_eq!(Role::Teamlead.to_string(), "teamlead");
    }
}
