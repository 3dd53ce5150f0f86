use crate::identity::Role;

/// Actions coarse enough to gate without calling the completion backend.
///
/// The intent classifier only ever produces the first three; ScheduleMeetings
/// exists so structured actions can be re-checked against the same table
/// before dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    AssignTasks,
    ApproveLeaves,
    ViewPayrollSelf,
    ScheduleMeetings,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AssignTasks => "assign_tasks",
            Self::ApproveLeaves => "approve_leaves",
            Self::ViewPayrollSelf => "view_payroll_self",
            Self::ScheduleMeetings => "schedule_meetings",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role/action matrix. Pure and total; only explicitly gated actions are
/// checked, everything else is permissive and left to the generation rules.
/// Fine-grained constraints (same-team assignment, self-only payroll) are
/// enforced downstream in the rules text, not here.
pub fn is_allowed(role: Role, action: Action) -> bool {
    match action {
        Action::ViewPayrollSelf => true,
        Action::AssignTasks | Action::ScheduleMeetings => !matches!(role, Role::Employee),
        Action::ApproveLeaves => matches!(role, Role::Manager | Role::Executive),
    }
}

#[cfg(test)]
mod tests {
    use super::{is_allowed, Action};
    use crate::identity::Role;

    #[test]
    fn employee_grants() {
        assert!(!is_allowed(Role::Employee, Action::AssignTasks));
        assert!(!is_allowed(Role::Employee, Action::ApproveLeaves));
        assert!(!is_allowed(Role::Employee, Action::ScheduleMeetings));
        assert!(is_allowed(Role::Employee, Action::ViewPayrollSelf));
    }

    #[test]
    fn teamlead_assigns_but_cannot_approve() {
        assert!(is_allowed(Role::Teamlead, Action::AssignTasks));
        assert!(!is_allowed(Role::Teamlead, Action::ApproveLeaves));
        assert!(is_allowed(Role::Teamlead, Action::ScheduleMeetings));
        assert!(is_allowed(Role::Teamlead, Action::ViewPayrollSelf));
    }

    #[test]
    fn manager_and_executive_have_full_grants() {
        for role in [Role::Manager, Role::Executive] {
            for action in [
                Action::AssignTasks,
                Action::ApproveLeaves,
                Action::ViewPayrollSelf,
                Action::ScheduleMeetings,
            ] {
                assert!(is_allowed(role, action), "{role} should be allowed {action}");
            }
        }
    }
}
