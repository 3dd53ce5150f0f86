//! Data-store collaborator for the TalentOps chat backend.
//!
//! The store is external: every interaction goes through a Supabase-style
//! REST surface consisting of a generic single-statement execution RPC, a
//! small set of named procedure RPCs, and a profile table read used for
//! display-name enrichment. `TalentStore` is the seam the dispatcher
//! depends on;
//! `SupabaseStore` is the production implementation.

pub mod supabase;

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use supabase::SupabaseStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("store returned an undecodable response: {0}")]
    Decode(String),
}

/// Display-name record for one profile id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileName {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl ProfileName {
    /// Human-readable label: full name when present, email otherwise.
    pub fn label(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.email.as_deref())
    }
}

#[async_trait]
pub trait TalentStore: Send + Sync {
    /// Execute one raw statement via the generic execution entry point.
    async fn run_query(&self, sql: &str) -> Result<Value, StoreError>;

    /// Invoke a named remote procedure with already-normalized parameters.
    async fn invoke_action(
        &self,
        name: &str,
        params: &Map<String, Value>,
    ) -> Result<Value, StoreError>;

    /// Batch-resolve profile ids to display names/emails.
    async fn lookup_profiles(
        &self,
        ids: &BTreeSet<String>,
    ) -> Result<BTreeMap<String, ProfileName>, StoreError>;
}
