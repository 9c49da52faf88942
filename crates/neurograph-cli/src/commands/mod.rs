//! CLI command implementations.

pub mod analyze;
pub mod chat;
pub mod config;
pub mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};
use neurograph_llm::OpenAiService;
use neurograph_session::Session;
use tracing::debug;

use crate::config::Config;

/// Build a session backed by the configured model endpoint.
pub fn open_session(config: &Config) -> Result<Arc<Session>> {
    let resolver = config.resolver()?;
    debug!(url = %resolver.api_url, model = %resolver.model_name, "resolver_selected");
    let service = OpenAiService::with_timeout(resolver, config.request_timeout())
        .context("Failed to set up the model service")?;
    Ok(Arc::new(Session::with_config(
        Arc::new(service),
        config.session_config(),
    )))
}
