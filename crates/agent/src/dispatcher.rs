//! Request dispatcher: pre-gate, generate, classify, execute, enrich.
//!
//! A request is terminal in exactly one of these states: gated before
//! generation, denied by the generator, action dispatched, or query
//! executed. Collaborator failures become structured replies; nothing here
//! panics or retries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use talentops_core::errors::DispatchError;
use talentops_core::identity::{ChatRequest, Identity, Role};
use talentops_core::intent::infer_action;
use talentops_core::permissions::is_allowed;
use talentops_store::{ProfileName, TalentStore};
use tracing::{info, warn};
use uuid::Uuid;

use crate::actions::{normalize_params, ActionName};
use crate::llm::LlmClient;
use crate::outcome::{classify, normalize_generated, GenerationOutcome, FALLBACK_REPLY};
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};
use crate::sqlguard;

/// Identity-reference fields eligible for enrichment, paired with the
/// derived display-name field each one produces.
const NAME_FIELDS: [(&str, &str); 4] = [
    ("assigned_to", "assigned_to_name"),
    ("assigned_by", "assigned_by_name"),
    ("employee_id", "employee_name"),
    ("reviewer_id", "reviewer_name"),
];

/// Wire-level reply. Serializes to the exact shapes the chat frontend
/// consumes; failure cases are ordinary replies, not HTTP errors.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatReply {
    Forbidden {
        reply: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    Action {
        action: &'static str,
        reply: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Query {
        sql: String,
        reply: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    ActionError {
        error: String,
        raw: String,
    },
    QueryError {
        error: String,
        sql: String,
    },
    RequestError {
        error: String,
    },
}

impl From<DispatchError> for ChatReply {
    fn from(error: DispatchError) -> Self {
        match error {
            DispatchError::PermissionDenied { role, action } => ChatReply::Forbidden {
                reply: "forbidden",
                reason: Some(format!("{role} cannot {action}")),
            },
            DispatchError::ActionParse { detail, raw } => {
                ChatReply::ActionError { error: format!("action_parse_failed: {detail}"), raw }
            }
            DispatchError::ActionExecution { detail, raw, .. } => {
                ChatReply::ActionError { error: format!("action_execution_failed: {detail}"), raw }
            }
            DispatchError::QueryRejected { detail, sql } => {
                ChatReply::QueryError { error: format!("query_rejected: {detail}"), sql }
            }
            DispatchError::QueryExecution { detail, sql } => {
                ChatReply::QueryError { error: detail, sql }
            }
        }
    }
}

pub struct ChatDispatcher {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn TalentStore>,
}

impl ChatDispatcher {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn TalentStore>) -> Self {
        Self { llm, store }
    }

    pub async fn handle(&self, request: &ChatRequest) -> ChatReply {
        let correlation_id = Uuid::new_v4().to_string();

        let role = match request.role.parse::<Role>() {
            Ok(role) => role,
            Err(error) => {
                warn!(
                    event_name = "chat.role.rejected",
                    correlation_id = %correlation_id,
                    role = %request.role,
                    "request carried an unknown role"
                );
                return ChatReply::RequestError { error: error.to_string() };
            }
        };
        let identity = Identity {
            user_id: request.user_id.clone(),
            role,
            team_id: request.team_id.clone(),
        };

        if let Some(action) = infer_action(&request.message) {
            if !is_allowed(role, action) {
                info!(
                    event_name = "chat.pregate.denied",
                    correlation_id = %correlation_id,
                    role = %role,
                    action = %action,
                    "intent denied by permission table before generation"
                );
                return DispatchError::PermissionDenied { role, action }.into();
            }
        }

        let generated = self.generate(&identity, &request.message, &correlation_id).await;
        let normalized = normalize_generated(&generated);

        let outcome = match classify(&normalized) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(
                    event_name = "chat.classify.failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "generated text looked structured but did not parse"
                );
                return error.into();
            }
        };

        match outcome {
            GenerationOutcome::Forbidden => {
                info!(
                    event_name = "chat.generation.forbidden",
                    correlation_id = %correlation_id,
                    role = %role,
                    "generator denied the request"
                );
                ChatReply::Forbidden { reply: "forbidden", reason: None }
            }
            GenerationOutcome::StructuredAction { name, params } => {
                self.dispatch_action(name, params, &identity, &normalized, &correlation_id).await
            }
            GenerationOutcome::RawQuery(sql) => {
                self.run_query(sql, &request.message, &correlation_id).await
            }
        }
    }

    async fn generate(
        &self,
        identity: &Identity,
        message: &str,
        correlation_id: &str,
    ) -> String {
        let prompt = build_user_prompt(identity, message);
        match self.llm.complete(SYSTEM_PROMPT, &prompt).await {
            Ok(text) => text,
            Err(error) => {
                warn!(
                    event_name = "chat.generation.failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "completion backend failed, degrading to fallback text"
                );
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn dispatch_action(
        &self,
        name: ActionName,
        params: Map<String, Value>,
        identity: &Identity,
        raw: &str,
        correlation_id: &str,
    ) -> ChatReply {
        if let Some(gated) = name.gated_action() {
            if !is_allowed(identity.role, gated) {
                info!(
                    event_name = "chat.action.denied",
                    correlation_id = %correlation_id,
                    role = %identity.role,
                    action = %name,
                    "structured action denied by permission table"
                );
                return DispatchError::PermissionDenied { role: identity.role, action: gated }
                    .into();
            }
        }

        let params = normalize_params(name, &params, identity);
        match self.store.invoke_action(name.as_str(), &params).await {
            Ok(data) => {
                info!(
                    event_name = "chat.action.dispatched",
                    correlation_id = %correlation_id,
                    action = %name,
                    "structured action executed"
                );
                let message = assignment_message(name, &params);
                ChatReply::Action { action: name.as_str(), reply: data, message }
            }
            Err(error) => {
                warn!(
                    event_name = "chat.action.failed",
                    correlation_id = %correlation_id,
                    action = %name,
                    error = %error,
                    "store rejected the action"
                );
                DispatchError::ActionExecution {
                    action: name.as_str(),
                    detail: error.to_string(),
                    raw: raw.to_string(),
                }
                .into()
            }
        }
    }

    async fn run_query(&self, sql: String, user_message: &str, correlation_id: &str) -> ChatReply {
        if let Err(violation) = sqlguard::check_statement(&sql) {
            warn!(
                event_name = "chat.query.rejected",
                correlation_id = %correlation_id,
                violation = %violation,
                "statement guard refused the generated text"
            );
            return DispatchError::QueryRejected { detail: violation.to_string(), sql }.into();
        }

        let data = match self.store.run_query(&sql).await {
            Ok(data) => data,
            Err(error) => {
                warn!(
                    event_name = "chat.query.failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "store rejected the statement"
                );
                return DispatchError::QueryExecution { detail: error.to_string(), sql }.into();
            }
        };

        match data {
            Value::Array(rows) if rows.is_empty() => ChatReply::Query {
                sql,
                reply: Value::Array(rows),
                message: Some(empty_result_hint(user_message).to_string()),
            },
            Value::Array(rows) => {
                let enriched = self.enrich_rows(rows, correlation_id).await;
                ChatReply::Query { sql, reply: Value::Array(enriched), message: None }
            }
            other => ChatReply::Query { sql, reply: other, message: None },
        }
    }

    /// Attach display names for any identity references found in the rows.
    /// A failed lookup leaves the rows untouched; it never fails the request.
    async fn enrich_rows(&self, rows: Vec<Value>, correlation_id: &str) -> Vec<Value> {
        let ids = collect_profile_ids(&rows);
        if ids.is_empty() {
            return rows;
        }

        let profiles = match self.store.lookup_profiles(&ids).await {
            Ok(profiles) => profiles,
            Err(error) => {
                warn!(
                    event_name = "chat.enrichment.lookup_failed",
                    correlation_id = %correlation_id,
                    error = %error,
                    "name lookup failed, returning rows unenriched"
                );
                return rows;
            }
        };

        rows.into_iter().map(|row| annotate_row(row, &profiles)).collect()
    }
}

/// Context-sensitive message for an empty result set, keyed off the
/// original user message rather than the generated statement.
fn empty_result_hint(user_message: &str) -> &'static str {
    let text = user_message.to_lowercase();
    if text.contains("leave") {
        "No pending leaves found."
    } else if text.contains("task") {
        "No tasks found."
    } else if text.contains("timesheet") {
        "No timesheets found."
    } else {
        "No records found."
    }
}

/// Friendly confirmation line for a dispatched action. Only
/// `assign_task_with_timesheet` carries one: "Assigned '<title>' to <email>".
/// Every other action returns `None`, leaving the `message` field unset.
fn assignment_message(name: ActionName, params: &Map<String, Value>) -> Option<String> {
    match name {
        ActionName::AssignTaskWithTimesheet => {
            let title = params.get("title").and_then(Value::as_str)?;
            let email = params.get("assignee_email").and_then(Value::as_str)?;
            Some(format!("Assigned '{title}' to {email}"))
        }
        _ => None,
    }
}

fn collect_profile_ids(rows: &[Value]) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    for row in rows {
        let Some(object) = row.as_object() else {
            continue;
        };
        for (field, _) in NAME_FIELDS {
            if let Some(id) = object.get(field).and_then(Value::as_str) {
                if !id.is_empty() {
                    ids.insert(id.to_string());
                }
            }
        }
    }
    ids
}

fn annotate_row(row: Value, profiles: &BTreeMap<String, ProfileName>) -> Value {
    let Value::Object(mut object) = row else {
        return row;
    };

    for (field, label) in NAME_FIELDS {
        let id = object.get(field).and_then(Value::as_str).map(str::to_string);
        let Some(id) = id else {
            continue;
        };
        if let Some(name) = profiles.get(&id).and_then(ProfileName::label) {
            object.insert(label.to_string(), Value::String(name.to_string()));
        }
    }

    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use talentops_core::identity::ChatRequest;
    use talentops_store::{ProfileName, StoreError, TalentStore};

    use super::{ChatDispatcher, ChatReply};
    use crate::llm::{LlmClient, LlmError};

    struct ScriptedLlm {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn returning(reply: &str) -> Self {
            Self { reply: Some(reply.to_string()), calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { reply: None, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(reply) => Ok(reply.clone()),
                None => Err(LlmError::EmptyResponse),
            }
        }
    }

    #[derive(Default)]
    struct FakeStore {
        query_response: Option<Value>,
        action_response: Option<Value>,
        profiles: BTreeMap<String, ProfileName>,
        fail_lookup: bool,
        queries: Mutex<Vec<String>>,
        actions: Mutex<Vec<(String, Map<String, Value>)>>,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl TalentStore for FakeStore {
        async fn run_query(&self, sql: &str) -> Result<Value, StoreError> {
            self.queries.lock().expect("queries lock").push(sql.to_string());
            match &self.query_response {
                Some(value) => Ok(value.clone()),
                None => Err(StoreError::Rejected {
                    status: 400,
                    body: "syntax error at or near".to_string(),
                }),
            }
        }

        async fn invoke_action(
            &self,
            name: &str,
            params: &Map<String, Value>,
        ) -> Result<Value, StoreError> {
            self.actions.lock().expect("actions lock").push((name.to_string(), params.clone()));
            match &self.action_response {
                Some(value) => Ok(value.clone()),
                None => Err(StoreError::Rejected {
                    status: 400,
                    body: "procedure rejected the call".to_string(),
                }),
            }
        }

        async fn lookup_profiles(
            &self,
            ids: &BTreeSet<String>,
        ) -> Result<BTreeMap<String, ProfileName>, StoreError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookup {
                return Err(StoreError::Rejected { status: 500, body: "unavailable".to_string() });
            }
            Ok(self
                .profiles
                .iter()
                .filter(|(id, _)| ids.contains(*id))
                .map(|(id, profile)| (id.clone(), profile.clone()))
                .collect())
        }
    }

    fn dispatcher(llm: ScriptedLlm, store: FakeStore) -> (ChatDispatcher, Arc<ScriptedLlm>, Arc<FakeStore>) {
        let llm = Arc::new(llm);
        let store = Arc::new(store);
        (ChatDispatcher::new(llm.clone(), store.clone()), llm, store)
    }

    fn request(role: &str, message: &str) -> ChatRequest {
        ChatRequest {
            user_id: "caller-1".to_string(),
            role: role.to_string(),
            team_id: Some("team-7".to_string()),
            message: message.to_string(),
        }
    }

    fn as_json(reply: &ChatReply) -> Value {
        serde_json::to_value(reply).expect("reply serializes")
    }

    #[tokio::test]
    async fn employee_assign_request_is_gated_before_any_collaborator_call() {
        let (dispatcher, llm, store) =
            dispatcher(ScriptedLlm::returning("unused"), FakeStore::default());

        let reply = dispatcher.handle(&request("employee", "assign task to bob@x.com")).await;

        assert_eq!(
            as_json(&reply),
            json!({ "reply": "forbidden", "reason": "employee cannot assign_tasks" })
        );
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
        assert!(store.queries.lock().expect("queries lock").is_empty());
        assert!(store.actions.lock().expect("actions lock").is_empty());
    }

    #[tokio::test]
    async fn unknown_role_is_rejected_before_any_collaborator_call() {
        let (dispatcher, llm, _store) =
            dispatcher(ScriptedLlm::returning("unused"), FakeStore::default());

        let reply = dispatcher.handle(&request("contractor", "show my tasks")).await;

        let json = as_json(&reply);
        assert!(json["error"].as_str().expect("error field").contains("contractor"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generator_denial_variants_yield_bare_forbidden_reply() {
        for variant in ["FORBIDDEN", "Forbidden.", "forbidden;"] {
            let (dispatcher, _llm, store) =
                dispatcher(ScriptedLlm::returning(variant), FakeStore::default());

            let reply = dispatcher.handle(&request("employee", "show my payroll")).await;

            assert_eq!(as_json(&reply), json!({ "reply": "forbidden" }), "variant: {variant}");
            assert!(store.queries.lock().expect("queries lock").is_empty());
        }
    }

    #[tokio::test]
    async fn manager_approve_leave_action_autofills_requester() {
        let generated = json!({
            "action": "approve_leave",
            "params": { "status": "approved", "leave_ids": ["a", "b"] }
        })
        .to_string();
        let store = FakeStore { action_response: Some(json!({"updated": 2})), ..FakeStore::default() };
        let (dispatcher, _llm, store) = dispatcher(ScriptedLlm::returning(&generated), store);

        let reply =
            dispatcher.handle(&request("manager", "approve all pending leaves for my team")).await;

        assert_eq!(as_json(&reply), json!({ "action": "approve_leave", "reply": {"updated": 2} }));

        let actions = store.actions.lock().expect("actions lock");
        let (name, params) = &actions[0];
        assert_eq!(name, "approve_leave");
        assert_eq!(params["requester_id"], "caller-1");
        assert_eq!(params["leave_ids"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn teamlead_approve_leave_action_is_denied_by_secondary_gate() {
        let generated = json!({
            "action": "approve_leave",
            "params": { "status": "approved", "leave_ids": ["a"] }
        })
        .to_string();
        let (dispatcher, _llm, store) =
            dispatcher(ScriptedLlm::returning(&generated), FakeStore::default());

        // Message avoids the pre-gate keywords so the structured-action gate
        // is what must catch it.
        let reply = dispatcher.handle(&request("teamlead", "sign off the pending requests")).await;

        assert_eq!(
            as_json(&reply),
            json!({ "reply": "forbidden", "reason": "teamlead cannot approve_leaves" })
        );
        assert!(store.actions.lock().expect("actions lock").is_empty());
    }

    #[tokio::test]
    async fn assign_action_reply_carries_friendly_message() {
        let generated = json!({
            "action": "assign_task_with_timesheet",
            "params": {
                "team_id": "team-7",
                "assignee_email": "bob@x.com",
                "title": "Fix login",
                "description": "",
                "priority": "medium",
                "status": "pending",
                "hours": 2,
                "date": "2026-02-03"
            }
        })
        .to_string();
        let store = FakeStore { action_response: Some(json!({"task_id": "t1"})), ..FakeStore::default() };
        let (dispatcher, _llm, store) = dispatcher(ScriptedLlm::returning(&generated), store);

        let reply = dispatcher.handle(&request("teamlead", "give bob the login fix")).await;

        let json = as_json(&reply);
        assert_eq!(json["action"], "assign_task_with_timesheet");
        assert_eq!(json["message"], "Assigned 'Fix login' to bob@x.com");

        let actions = store.actions.lock().expect("actions lock");
        assert_eq!(actions[0].1["requester_id"], "caller-1");
    }

    #[tokio::test]
    async fn schedule_meeting_dispatches_procedure_signature_keys() {
        let generated = json!({
            "action": "schedule_meeting_timesheet",
            "params": { "date": "2026-03-04T10:30:00", "hours": 2 }
        })
        .to_string();
        let store = FakeStore { action_response: Some(Value::Null), ..FakeStore::default() };
        let (dispatcher, _llm, store) = dispatcher(ScriptedLlm::returning(&generated), store);

        let reply = dispatcher.handle(&request("manager", "set up a sync on march 4th")).await;

        assert_eq!(
            as_json(&reply),
            json!({ "action": "schedule_meeting_timesheet", "reply": null })
        );

        let actions = store.actions.lock().expect("actions lock");
        let (_, params) = &actions[0];
        assert_eq!(params["p_requester"], "caller-1");
        assert_eq!(params["p_team_id"], "team-7");
        assert_eq!(params["p_date"], "2026-03-04");
        assert_eq!(params["p_hours"], 2);
        assert!(!params.contains_key("date"));
    }

    #[tokio::test]
    async fn malformed_action_json_reports_parse_failure_without_store_call() {
        let (dispatcher, _llm, store) =
            dispatcher(ScriptedLlm::returning("{\"action\": }"), FakeStore::default());

        let reply = dispatcher.handle(&request("manager", "do the thing")).await;

        let json = as_json(&reply);
        assert!(json["error"].as_str().expect("error field").starts_with("action_parse_failed: "));
        assert_eq!(json["raw"], "{\"action\": }");
        assert!(store.queries.lock().expect("queries lock").is_empty());
        assert!(store.actions.lock().expect("actions lock").is_empty());
    }

    #[tokio::test]
    async fn unknown_action_name_falls_through_to_guarded_query_path() {
        let generated = json!({"action": "wipe_database", "params": {}}).to_string();
        let (dispatcher, _llm, store) =
            dispatcher(ScriptedLlm::returning(&generated), FakeStore::default());

        let reply = dispatcher.handle(&request("manager", "do the thing")).await;

        // The payload is not a statement, so the guard rejects it before the
        // store sees anything.
        let json = as_json(&reply);
        assert!(json["error"].as_str().expect("error field").starts_with("query_rejected: "));
        assert!(store.queries.lock().expect("queries lock").is_empty());
        assert!(store.actions.lock().expect("actions lock").is_empty());
    }

    #[tokio::test]
    async fn action_execution_failure_is_reported_with_raw_payload() {
        let generated = json!({
            "action": "approve_leave",
            "params": { "status": "approved", "leave_ids": [] }
        })
        .to_string();
        let (dispatcher, _llm, _store) =
            dispatcher(ScriptedLlm::returning(&generated), FakeStore::default());

        let reply = dispatcher.handle(&request("manager", "approve everything pending")).await;

        let json = as_json(&reply);
        assert!(json["error"]
            .as_str()
            .expect("error field")
            .starts_with("action_execution_failed: "));
        assert_eq!(json["raw"], generated);
    }

    #[tokio::test]
    async fn empty_result_uses_message_keyword_for_hint() {
        let store =
            FakeStore { query_response: Some(json!([])), ..FakeStore::default() };
        let (dispatcher, _llm, _store) = dispatcher(
            ScriptedLlm::returning("SELECT * FROM timesheets_talentops WHERE hours > 8"),
            store,
        );

        let reply = dispatcher.handle(&request("manager", "show long timesheet entries")).await;

        assert_eq!(
            as_json(&reply),
            json!({
                "sql": "SELECT * FROM timesheets_talentops WHERE hours > 8",
                "reply": [],
                "message": "No timesheets found."
            })
        );
    }

    #[tokio::test]
    async fn rows_are_enriched_with_display_names() {
        let store = FakeStore {
            query_response: Some(json!([
                { "id": "t1", "assigned_to": "u1", "assigned_by": "u2", "title": "Fix login" }
            ])),
            profiles: BTreeMap::from([
                (
                    "u1".to_string(),
                    ProfileName { name: Some("Alice".to_string()), email: None },
                ),
                (
                    "u2".to_string(),
                    ProfileName { name: None, email: Some("carol@x.com".to_string()) },
                ),
            ]),
            ..FakeStore::default()
        };
        let (dispatcher, _llm, _store) = dispatcher(
            ScriptedLlm::returning("SELECT * FROM tasks_talentops"),
            store,
        );

        let reply = dispatcher.handle(&request("manager", "list open work")).await;

        let json = as_json(&reply);
        assert_eq!(
            json["reply"],
            json!([{
                "id": "t1",
                "assigned_to": "u1",
                "assigned_to_name": "Alice",
                "assigned_by": "u2",
                "assigned_by_name": "carol@x.com",
                "title": "Fix login"
            }])
        );
    }

    #[tokio::test]
    async fn lookup_failure_degrades_to_unenriched_rows() {
        let store = FakeStore {
            query_response: Some(json!([{ "id": "t1", "assigned_to": "u1" }])),
            fail_lookup: true,
            ..FakeStore::default()
        };
        let (dispatcher, _llm, store) = dispatcher(
            ScriptedLlm::returning("SELECT * FROM tasks_talentops"),
            store,
        );

        let reply = dispatcher.handle(&request("manager", "list open work")).await;

        let json = as_json(&reply);
        assert_eq!(json["reply"], json!([{ "id": "t1", "assigned_to": "u1" }]));
        assert_eq!(store.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rows_without_identity_fields_skip_the_lookup() {
        let store = FakeStore {
            query_response: Some(json!([{ "id": "a1", "title": "Offsite" }])),
            ..FakeStore::default()
        };
        let (dispatcher, _llm, store) = dispatcher(
            ScriptedLlm::returning("SELECT * FROM announcements_talentops"),
            store,
        );

        dispatcher.handle(&request("employee", "any announcements")).await;

        assert_eq!(store.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_rejection_surfaces_error_and_sql() {
        let (dispatcher, _llm, _store) = dispatcher(
            ScriptedLlm::returning("SELECT * FROM tasks_talentops"),
            FakeStore::default(),
        );

        let reply = dispatcher.handle(&request("manager", "list open work")).await;

        let json = as_json(&reply);
        assert!(json["error"].as_str().expect("error field").contains("syntax error"));
        assert_eq!(json["sql"], "SELECT * FROM tasks_talentops");
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_rejected_fallback_query() {
        let (dispatcher, llm, store) = dispatcher(ScriptedLlm::failing(), FakeStore::default());

        let reply = dispatcher.handle(&request("manager", "list open work")).await;

        let json = as_json(&reply);
        assert!(json["error"].as_str().expect("error field").starts_with("query_rejected: "));
        assert_eq!(json["sql"], "Sorry, I could not process that.");
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
        assert!(store.queries.lock().expect("queries lock").is_empty());
    }
}
