use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::prompts::{analysis_request, DEFAULT_SYSTEM_PROMPT};
use super::{format_user_data, UserData};
use crate::admin::first_coach_prompt;
use crate::errors::AppError;
use crate::llm_client::Usage;
use crate::state::AppState;

const NO_ANALYSIS: &str = "The analysis could not be retrieved.";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub user_data: Option<Value>,
    pub custom_prompt: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub analysis: String,
    pub model: String,
    pub usage: Usage,
}

/// System prompt priority: request, then the first coach prompt on file, then the default.
async fn resolve_system_prompt(state: &AppState, custom: Option<String>) -> String {
    if let Some(prompt) = custom.filter(|p| !p.trim().is_empty()) {
        return prompt;
    }
    match first_coach_prompt(state.store.as_ref(), &state.config.tables.users).await {
        Ok(Some(prompt)) => prompt,
        Ok(None) => DEFAULT_SYSTEM_PROMPT.to_string(),
        Err(e) => {
            warn!("Failed to load coach prompt, using default: {e}");
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

/// POST /api/ai/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let llm = state
        .llm
        .as_ref()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("ANTHROPIC_API_KEY is not configured")))?;
    let user_data = req
        .user_data
        .filter(|v| !v.is_null())
        .ok_or_else(|| AppError::Validation("userData is required".into()))?;
    let data = UserData::from_json(&user_data)
        .map_err(|e| AppError::Validation(format!("Invalid userData: {e}")))?;

    let system = resolve_system_prompt(&state, req.custom_prompt).await;
    let prompt = analysis_request(
        data.user_name.as_deref().unwrap_or("User"),
        &format_user_data(&data.records),
    );

    let response = llm.call(&prompt, &system).await?;
    info!(
        modules = data.records.len(),
        output_tokens = response.usage.output_tokens,
        "AI analysis complete"
    );

    Ok(Json(AnalyzeResponse {
        analysis: response.text().unwrap_or(NO_ANALYSIS).to_string(),
        model: response.model,
        usage: response.usage,
    }))
}
