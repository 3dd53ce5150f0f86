use std::sync::Arc;

use talentops_agent::{ChatDispatcher, OpenAiChatClient};
use talentops_core::config::{AppConfig, ConfigError, LoadOptions};
use talentops_store::SupabaseStore;
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub dispatcher: Arc<ChatDispatcher>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("http client construction failed: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let store = SupabaseStore::from_config(&config.store).map_err(BootstrapError::HttpClient)?;
    let llm = OpenAiChatClient::from_config(&config.llm).map_err(BootstrapError::HttpClient)?;

    info!(
        event_name = "system.bootstrap.clients_ready",
        correlation_id = "bootstrap",
        store_url = %config.store.url,
        llm_model = %config.llm.model,
        "store and completion clients constructed"
    );

    let dispatcher = Arc::new(ChatDispatcher::new(Arc::new(llm), Arc::new(store)));

    Ok(Application { config, dispatcher })
}
