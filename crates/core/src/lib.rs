//! Domain core for the TalentOps chat backend.
//!
//! Holds everything the translation pipeline agrees on before any external
//! call is made: the fixed role set, the static role/action permission
//! table, the keyword intent pre-filter, the request error taxonomy, and
//! layered application configuration.

pub mod config;
pub mod errors;
pub mod identity;
pub mod intent;
pub mod permissions;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use errors::DispatchError;
pub use identity::{ChatRequest, Identity, Role, RoleParseError};
pub use intent::infer_action;
pub use permissions::{is_allowed, Action};
