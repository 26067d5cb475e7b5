use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::schema::{ModuleType, WorkRecord};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWorkRequest {
    pub user_id: String,
    pub data: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWorkResponse {
    pub ok: bool,
    pub module: ModuleType,
    pub record_id: String,
}

/// PUT /api/work/:module
pub async fn handle_save_work(
    State(state): State<AppState>,
    Path(module): Path<String>,
    Json(req): Json<SaveWorkRequest>,
) -> Result<Json<SaveWorkResponse>, AppError> {
    let module = ModuleType::from_slug(&module);
    let table_id = state
        .config
        .tables
        .for_module(&module)
        .ok_or_else(|| AppError::NotFound(format!("Unknown module '{module}'")))?;
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("userId is required".into()));
    }

    let record = WorkRecord::from_json(&module, req.data)
        .map_err(|e| AppError::Validation(format!("Invalid {module} data: {e}")))?;
    let saved = super::save(state.store.as_ref(), table_id, user_id, &record).await?;
    info!(%module, user_id, record_id = %saved.record_id, "Saved work record");

    Ok(Json(SaveWorkResponse {
        ok: true,
        module,
        record_id: saved.record_id,
    }))
}
