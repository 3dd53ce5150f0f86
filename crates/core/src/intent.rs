use crate::permissions::Action;

/// Cheap keyword pre-filter run before any completion call.
///
/// Intentionally coarse: it only has to catch requests the permission table
/// can reject outright, so an obviously forbidden message never reaches the
/// backend and cannot be talked around with prompt manipulation. The
/// generator remains the authority for everything this misses.
pub fn infer_action(message: &str) -> Option<Action> {
    let text = message.to_lowercase();
    if text.contains("assign") && text.contains("task") {
        return Some(Action::AssignTasks);
    }
    if text.contains("approve") && text.contains("leave") {
        return Some(Action::ApproveLeaves);
    }
    if text.contains("payroll") || text.contains("payslip") {
        return Some(Action::ViewPayrollSelf);
    }
    None
}
