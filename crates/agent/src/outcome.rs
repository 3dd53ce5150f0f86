//! Normalization and classification of generated text.
//!
//! The completion backend answers with one unstructured string for every
//! request kind, so nothing downstream may touch it before it has been
//! forced into exactly one of three outcomes. JSON-looking text that does
//! not parse becomes an explicit error, never a statement to execute.

use serde_json::{Map, Value};
use talentops_core::errors::DispatchError;

use crate::actions::ActionName;

/// Safe non-actionable text substituted when the completion backend fails.
/// The statement guard rejects it, so it can never be read as FORBIDDEN or
/// as a valid action.
pub const FALLBACK_REPLY: &str = "Sorry, I could not process that.";

/// Canonical denial token.
pub const FORBIDDEN_TOKEN: &str = "FORBIDDEN";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationOutcome {
    Forbidden,
    StructuredAction { name: ActionName, params: Map<String, Value> },
    RawQuery(String),
}

/// Strip code-fence markup, trim, and canonicalize denial variants.
/// Idempotent: normalizing an already-normalized string is a no-op.
pub fn normalize_generated(raw: &str) -> String {
    let text = if raw.contains("```") { raw.replace("```", "") } else { raw.to_string() };
    let cleaned = text.trim();

    if cleaned.to_ascii_uppercase().trim_end_matches(['.', ';']) == FORBIDDEN_TOKEN {
        FORBIDDEN_TOKEN.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Classify normalized text into its outcome kind.
///
/// Text shaped like an action payload must parse as JSON or the request
/// fails with a parse error; a parsed payload whose action name is not
/// recognized falls through to query execution, where the store rejects it.
pub fn classify(text: &str) -> Result<GenerationOutcome, DispatchError> {
    if text == FORBIDDEN_TOKEN {
        return Ok(GenerationOutcome::Forbidden);
    }

    if !looks_like_action(text) {
        return Ok(GenerationOutcome::RawQuery(text.to_string()));
    }

    let payload: Value = serde_json::from_str(text).map_err(|err| DispatchError::ActionParse {
        detail: err.to_string(),
        raw: text.to_string(),
    })?;

    let name = payload.get("action").and_then(Value::as_str).unwrap_or_default();
    match name.parse::<ActionName>() {
        Ok(action) => {
            let params =
                payload.get("params").and_then(Value::as_object).cloned().unwrap_or_default();
            Ok(GenerationOutcome::StructuredAction { name: action, params })
        }
        Err(_) => Ok(GenerationOutcome::RawQuery(text.to_string())),
    }
}

fn looks_like_action(text: &str) -> bool {
    text.starts_with('{') && text.contains("\"action\"")
}
