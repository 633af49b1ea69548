use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; nothing here is shared mutably across requests.
#[derive(Clone)]
pub struct AppState {
    /// Chat-completion backend. `AzureOpenAiClient` in production, a stub in tests.
    pub model: Arc<dyn ChatModel>,
    pub config: Config,
}
