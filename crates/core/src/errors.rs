use thiserror::Error;

use crate::identity::Role;
use crate::permissions::Action;

/// Terminal failure states of a single chat request.
///
/// Every variant is surfaced to the caller as a structured reply carrying
/// enough context to debug (action name or statement text) and never an
/// internal stack trace; none of them aborts the process. The non-fatal
/// lookup failure is deliberately absent: enrichment degrades silently.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Rejected by the permission table before any generation call.
    #[error("{role} cannot {action}")]
    PermissionDenied { role: Role, action: Action },
    /// Generated text looked like an action payload but did not parse.
    #[error("action_parse_failed: {detail}")]
    ActionParse { detail: String, raw: String },
    /// The store rejected a recognized action RPC.
    #[error("action_execution_failed: {detail}")]
    ActionExecution { action: &'static str, detail: String, raw: String },
    /// The statement guard refused to send the text to the store.
    #[error("query_rejected: {detail}")]
    QueryRejected { detail: String, sql: String },
    /// The store rejected the raw statement.
    #[error("{detail}")]
    QueryExecution { detail: String, sql: String },
}
