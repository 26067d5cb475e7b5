use std::sync::Arc;

use crate::config::Config;
use crate::lark::{LarkClient, RecordStore};
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Table access. In production this is the same `LarkClient` as `lark`.
    pub store: Arc<dyn RecordStore>,
    /// Used directly only for the OAuth flow.
    pub lark: LarkClient,
    /// `None` when `ANTHROPIC_API_KEY` is not configured.
    pub llm: Option<LlmClient>,
    pub config: Config,
}
