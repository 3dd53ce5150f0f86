//! Translation layer - role-gated natural language to SQL/RPC dispatch
//!
//! This crate is the "brain" of the TalentOps chat backend:
//! - Builds a role-aware generation request and calls the completion backend
//! - Normalizes and classifies the untrusted text it gets back
//! - Validates raw statements before they reach the store
//! - Dispatches structured actions with parameter normalization
//! - Enriches query results with human-readable names
//!
//! # Architecture
//!
//! A request moves through a constrained pipeline:
//! 1. **Pre-gate** - keyword intent + permission table, before any external call
//! 2. **Generation** (`prompt`, `llm`) - role/identity/rules embedded in one prompt
//! 3. **Classification** (`outcome`) - Forbidden | StructuredAction | RawQuery
//! 4. **Dispatch** (`dispatcher`) - action RPC or guarded query + enrichment
//!
//! # Safety Principle
//!
//! The completion backend is strictly a translator and its output is never
//! trusted directly. Every response is classified into a tagged outcome, and
//! both the statement guard (`sqlguard`) and the permission table get a
//! deterministic say before anything touches the store.

pub mod actions;
pub mod dispatcher;
pub mod llm;
pub mod openai;
pub mod outcome;
pub mod prompt;
pub mod sqlguard;

pub use dispatcher::{ChatDispatcher, ChatReply};
pub use llm::{LlmClient, LlmError};
pub use openai::OpenAiChatClient;
