//! Supabase (PostgREST) implementation of [`TalentStore`].

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use talentops_core::config::StoreConfig;
use tracing::debug;

use crate::{ProfileName, StoreError, TalentStore};

/// Generic single-statement execution procedure exposed by the store.
const EXECUTE_SQL_FN: &str = "execute_sql_chatbot";
/// Profile table backing the identity lookup.
const PROFILES_TABLE: &str = "profiles_talentops";

/// Rejection bodies are surfaced to the caller; keep them bounded.
const MAX_ERROR_BODY_LEN: usize = 512;

pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl SupabaseStore {
    pub fn from_config(config: &StoreConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn rpc(&self, function: &str, payload: &Value) -> Result<Value, StoreError> {
        let url = format!("{}/rest/v1/rpc/{function}", self.base_url);
        debug!(event_name = "store.rpc.request", function, "invoking store procedure");

        let response = self
            .http
            .post(&url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .json(payload)
            .send()
            .await?;

        decode_response(response).await
    }
}

#[async_trait]
impl TalentStore for SupabaseStore {
    async fn run_query(&self, sql: &str) -> Result<Value, StoreError> {
        self.rpc(EXECUTE_SQL_FN, &json!({ "sql": sql })).await
    }

    async fn invoke_action(
        &self,
        name: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, StoreError> {
        self.rpc(name, &Value::Object(params.clone())).await
    }

    async fn lookup_profiles(
        &self,
        ids: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, ProfileName>, StoreError> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let quoted = ids.iter().map(|id| format!("\"{id}\"")).collect::<Vec<_>>().join(",");
        let filter = format!("in.({quoted})");
        let url = format!("{}/rest/v1/{PROFILES_TABLE}", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("select", "id,full_name,email"), ("id", filter.as_str())])
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await?;

        let rows = decode_response(response).await?;
        Ok(profiles_from_rows(&rows))
    }
}

async fn decode_response(response: reqwest::Response) -> Result<Value, StoreError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let mut body = body;
        body.truncate(MAX_ERROR_BODY_LEN);
        return Err(StoreError::Rejected { status: status.as_u16(), body });
    }

    // Void procedures answer with an empty body.
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|err| StoreError::Decode(err.to_string()))
}

fn profiles_from_rows(rows: &Value) -> BTreeMap<String, ProfileName> {
    let mut profiles = BTreeMap::new();

    let Some(rows) = rows.as_array() else {
        return profiles;
    };

    for row in rows {
        let Some(id) = row.get("id").and_then(Value::as_str) else {
            continue;
        };
        profiles.insert(
            id.to_string(),
            ProfileName {
                name: row.get("full_name").and_then(Value::as_str).map(str::to_string),
                email: row.get("email").and_then(Value::as_str).map(str::to_string),
            },
        );
    }

    profiles
}
