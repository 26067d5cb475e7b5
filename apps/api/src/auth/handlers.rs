use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use super::page::{render_login_error, render_login_success};
use super::{authenticate, new_oauth_state, normalize_email, MIN_PASSWORD_LEN};
use crate::credentials::hash_password_blocking;
use crate::errors::AppError;
use crate::models::user::{find_user, User, UserProfile};
use crate::state::AppState;
use crate::work::load_all;

#[derive(Serialize)]
pub struct LoginUrlResponse {
    pub url: String,
    pub state: String,
}

/// GET /api/auth/login
pub async fn handle_login_url(
    State(state): State<AppState>,
) -> Result<Json<LoginUrlResponse>, AppError> {
    let oauth_state = new_oauth_state();
    let url = state
        .lark
        .authorize_url(&state.config.oauth_redirect_uri, &oauth_state)?;
    Ok(Json(LoginUrlResponse {
        url: url.to_string(),
        state: oauth_state,
    }))
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// GET /api/auth/callback
pub async fn handle_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Html(render_login_error("No authorization code provided")),
        )
            .into_response();
    };

    match state.lark.login_with_code(&code).await {
        Ok(user) => {
            info!(open_id = %user.open_id, "OAuth login");
            let login_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            Html(render_login_success(&user, &login_at)).into_response()
        }
        Err(e) => {
            error!("OAuth callback failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(render_login_error("Sign-in with Lark failed. Please try again.")),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// POST /api/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }
    let email = normalize_email(&req.email)
        .ok_or_else(|| AppError::Validation("a valid email is required".into()))?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let users_table = &state.config.tables.users;
    if find_user(state.store.as_ref(), users_table, "email", &email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("This email is already registered".into()));
    }

    let password_hash = hash_password_blocking(req.password).await?;
    let user_id = Uuid::new_v4().to_string();
    let record = state
        .store
        .create(
            users_table,
            User::new_member_fields(&user_id, name, &email, &password_hash),
        )
        .await?;
    info!(%user_id, "Registered member");

    let user = User::from_record(&record);
    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}

#[derive(Deserialize)]
pub struct PasswordLoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/auth/member-login
pub async fn handle_member_login(
    State(state): State<AppState>,
    Json(req): Json<PasswordLoginRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("email and password are required".into()));
    }
    let user = authenticate(
        state.store.as_ref(),
        &state.config.tables.users,
        email,
        &req.password,
    )
    .await?;
    Ok(Json(UserProfile::from(&user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub user_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub user_id: String,
    /// Module slug → decoded record. Modules with no saved row are absent.
    pub data: BTreeMap<String, Value>,
    pub restored_count: usize,
}

/// POST /api/auth/sync
pub async fn handle_sync(
    State(state): State<AppState>,
    Json(req): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let user_id = req.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("userId is required".into()));
    }

    let records = load_all(state.store.as_ref(), &state.config.tables, user_id).await;
    let data: BTreeMap<String, Value> = records
        .into_iter()
        .filter_map(|(module, record)| Some((module.as_str().to_string(), record?.to_json())))
        .collect();

    Ok(Json(SyncResponse {
        user_id: user_id.to_string(),
        restored_count: data.len(),
        data,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvatarRequest {
    pub user_id: String,
    #[serde(default)]
    pub avatar: String,
}

/// POST /api/auth/update-avatar
pub async fn handle_update_avatar(
    State(state): State<AppState>,
    Json(req): Json<UpdateAvatarRequest>,
) -> Result<Json<Value>, AppError> {
    if req.user_id.trim().is_empty() {
        return Err(AppError::Validation("userId is required".into()));
    }
    let users_table = &state.config.tables.users;
    let user = find_user(state.store.as_ref(), users_table, "user_id", req.user_id.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut fields = crate::schema::FlatFields::new();
    fields.insert("avatar".into(), Value::String(req.avatar));
    state
        .store
        .update(users_table, &user.record_id, fields)
        .await?;
    Ok(Json(json!({ "ok": true })))
}
