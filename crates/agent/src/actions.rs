//! Named remote actions and their parameter contracts.
//!
//! The set and the field names must match the store's procedure signatures
//! exactly; normalization here is what turns generated parameter maps into
//! dispatchable ones.

use serde_json::{Map, Value};
use talentops_core::identity::Identity;
use talentops_core::permissions::Action;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionName {
    AssignTaskWithTimesheet,
    ApproveLeave,
    UpsertTimesheet,
    ScheduleMeetingTimesheet,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown action `{0}`")]
pub struct UnknownAction(pub String);

impl std::str::FromStr for ActionName {
    type Err = UnknownAction;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "assign_task_with_timesheet" => Ok(Self::AssignTaskWithTimesheet),
            "approve_leave" => Ok(Self::ApproveLeave),
            "upsert_timesheet" => Ok(Self::UpsertTimesheet),
            "schedule_meeting_timesheet" => Ok(Self::ScheduleMeetingTimesheet),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

impl ActionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssignTaskWithTimesheet => "assign_task_with_timesheet",
            Self::ApproveLeave => "approve_leave",
            Self::UpsertTimesheet => "upsert_timesheet",
            Self::ScheduleMeetingTimesheet => "schedule_meeting_timesheet",
        }
    }

    /// Coarse permission tag re-checked before dispatch. `upsert_timesheet`
    /// is self-scoped and stays ungated; its finer rules live in the
    /// generation rules text.
    pub fn gated_action(&self) -> Option<Action> {
        match self {
            Self::AssignTaskWithTimesheet => Some(Action::AssignTasks),
            Self::ApproveLeave => Some(Action::ApproveLeaves),
            Self::ScheduleMeetingTimesheet => Some(Action::ScheduleMeetings),
            Self::UpsertTimesheet => None,
        }
    }
}

impl std::fmt::Display for ActionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rewrite generated parameters into the exact shape the store procedure
/// expects: identity fields auto-filled from the caller, and the meeting
/// procedure's `p_*` signature rebuilt with date truncation and an hours
/// default.
pub fn normalize_params(
    action: ActionName,
    params: &Map<String, Value>,
    identity: &Identity,
) -> Map<String, Value> {
    let mut params = params.clone();

    // The employee default must land before the requester fill so a
    // self-submitted timesheet keeps employee_id = requester.
    if action == ActionName::UpsertTimesheet && !params.contains_key("employee_id") {
        params.insert("employee_id".to_string(), Value::String(identity.user_id.clone()));
    }
    if !params.contains_key("requester_id") {
        params.insert("requester_id".to_string(), Value::String(identity.user_id.clone()));
    }

    if action == ActionName::ScheduleMeetingTimesheet {
        return meeting_params(&params, identity);
    }

    params
}

fn meeting_params(params: &Map<String, Value>, identity: &Identity) -> Map<String, Value> {
    let p_requester = params
        .get("requester_id")
        .cloned()
        .unwrap_or_else(|| Value::String(identity.user_id.clone()));

    let p_team_id = params.get("team_id").cloned().unwrap_or_else(|| {
        identity.team_id.clone().map(Value::String).unwrap_or(Value::Null)
    });

    let p_date = match params.get("date") {
        Some(Value::String(raw)) => Value::String(truncate_to_date(raw)),
        Some(other) => other.clone(),
        None => Value::Null,
    };

    let p_hours = params.get("hours").cloned().unwrap_or_else(|| Value::from(1));

    let mut renamed = Map::new();
    renamed.insert("p_requester".to_string(), p_requester);
    renamed.insert("p_team_id".to_string(), p_team_id);
    renamed.insert("p_date".to_string(), p_date);
    renamed.insert("p_hours".to_string(), p_hours);
    renamed
}

/// Drop any time-of-day component, keeping the `YYYY-MM-DD` prefix.
fn truncate_to_date(raw: &str) -> String {
    match raw.split_once('T') {
        Some((date, _)) => date.to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Map, Value};
    use talentops_core::identity::{Identity, Role};

    use super::{normalize_params, ActionName};

    fn caller() -> Identity {
        Identity {
            user_id: "caller-1".to_string(),
            role: Role::Manager,
            team_id: Some("team-7".to_string()),
        }
    }

    fn params_from(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn requester_id_is_filled_from_caller_when_absent() {
        let params = params_from(json!({ "status": "approved", "leave_ids": ["a"] }));
        let normalized = normalize_params(ActionName::ApproveLeave, &params, &caller());
        assert_eq!(normalized["requester_id"], "caller-1");
        assert_eq!(normalized["status"], "approved");
    }

    #[test]
    fn explicit_requester_id_is_preserved() {
        let params = params_from(json!({ "requester_id": "someone-else" }));
        let normalized = normalize_params(ActionName::ApproveLeave, &params, &caller());
        assert_eq!(normalized["requester_id"], "someone-else");
    }

    #[test]
    fn upsert_timesheet_defaults_employee_to_caller() {
        let params = params_from(json!({ "date": "2026-02-03", "hours": 8, "source": "self" }));
        let normalized = normalize_params(ActionName::UpsertTimesheet, &params, &caller());
        assert_eq!(normalized["employee_id"], "caller-1");
        assert_eq!(normalized["requester_id"], "caller-1");
    }

    #[test]
    fn meeting_params_are_renamed_to_procedure_signature() {
        let params = params_from(json!({
            "team_id": "team-42",
            "date": "2026-03-04T10:30:00Z",
            "hours": 2
        }));
        let normalized =
            normalize_params(ActionName::ScheduleMeetingTimesheet, &params, &caller());

        assert_eq!(normalized.len(), 4);
        for key in ["p_requester", "p_team_id", "p_date", "p_hours"] {
            assert!(normalized.contains_key(key), "missing {key}");
        }
        assert_eq!(normalized["p_requester"], "caller-1");
        assert_eq!(normalized["p_team_id"], "team-42");
        assert_eq!(normalized["p_date"], "2026-03-04");
        assert_eq!(normalized["p_hours"], 2);
    }

    #[test]
    fn meeting_defaults_hours_and_team_from_context() {
        let params = params_from(json!({ "date": "2026-03-04" }));
        let normalized =
            normalize_params(ActionName::ScheduleMeetingTimesheet, &params, &caller());

        assert_eq!(normalized["p_hours"], 1);
        assert_eq!(normalized["p_team_id"], "team-7");
        assert_eq!(normalized["p_date"], "2026-03-04");
    }

    #[test]
    fn meeting_date_absent_becomes_null() {
        let params = Map::new();
        let normalized =
            normalize_params(ActionName::ScheduleMeetingTimesheet, &params, &caller());
        assert_eq!(normalized["p_date"], Value::Null);
    }

    #[test]
    fn action_names_round_trip() {
        for name in
            ["assign_task_with_timesheet", "approve_leave", "upsert_timesheet", "schedule_meeting_timesheet"]
        {
            let parsed = name.parse::<ActionName>().expect("known action");
            assert_eq!(parsed.as_str(), name);
        }
        assert!("drop_everything".parse::<ActionName>().is_err());
    }
}
