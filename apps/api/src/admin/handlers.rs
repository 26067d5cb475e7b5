use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

use super::{
    admin_emails, assign_member, require_coach, require_own_member, AdminSource, Assignment,
    PromptSetting,
};
use crate::auth::authenticate;
use crate::credentials::{generate_reset_password, hash_password_blocking};
use crate::errors::AppError;
use crate::models::user::{User, UserProfile};
use crate::schema::FlatFields;
use crate::state::AppState;
use crate::work::load_all;

fn required<'a>(value: &'a str, name: &str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{name} is required")));
    }
    Ok(value)
}

#[derive(Deserialize)]
pub struct AdminCheckQuery {
    #[serde(default)]
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCheckResponse {
    pub is_admin: bool,
    pub source: AdminSource,
}

/// GET /api/admin-check
pub async fn handle_admin_check(
    State(state): State<AppState>,
    Query(query): Query<AdminCheckQuery>,
) -> Result<Json<AdminCheckResponse>, AppError> {
    let email = required(&query.email, "email")?.to_lowercase();
    let (admins, source) = admin_emails(
        state.store.as_ref(),
        state.config.tables.settings.as_deref(),
        &state.config.admin_emails,
    )
    .await;
    Ok(Json(AdminCheckResponse {
        is_admin: admins.contains(&email),
        source,
    }))
}

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/admin/login
pub async fn handle_admin_login(
    State(state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let email = required(&req.email, "email")?;
    if req.password.is_empty() {
        return Err(AppError::Validation("password is required".into()));
    }
    let user = authenticate(
        state.store.as_ref(),
        &state.config.tables.users,
        email,
        &req.password,
    )
    .await?;
    if !user.is_coach() {
        return Err(AppError::Forbidden(
            "Coach role required. Contact an administrator.".into(),
        ));
    }
    Ok(Json(UserProfile::from(&user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub user_id: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// POST /api/admin/verify
pub async fn handle_verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    let user_id = required(&req.user_id, "userId")?;
    let coach = require_coach(state.store.as_ref(), &state.config.tables.users, user_id).await?;
    Ok(Json(VerifyResponse {
        valid: true,
        profile: UserProfile::from(&coach),
    }))
}

#[derive(Deserialize)]
pub struct CoachQuery {
    #[serde(default)]
    pub coach_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: Option<Value>,
}

/// GET /api/admin/members
pub async fn handle_members(
    State(state): State<AppState>,
    Query(query): Query<CoachQuery>,
) -> Result<Json<Value>, AppError> {
    let coach_id = required(&query.coach_id, "coach_id")?;
    let users_table = &state.config.tables.users;
    require_coach(state.store.as_ref(), users_table, coach_id).await?;

    let members: Vec<MemberSummary> = state
        .store
        .search(users_table, "coach_id", coach_id)
        .await?
        .iter()
        .map(User::from_record)
        .map(|m| MemberSummary {
            user_id: m.user_id,
            name: m.name,
            email: m.email,
            created_at: m.created_at,
        })
        .collect();
    Ok(Json(json!({ "members": members })))
}

#[derive(Deserialize)]
pub struct MemberDataQuery {
    #[serde(default)]
    pub coach_id: String,
    #[serde(default)]
    pub member_id: String,
}

/// GET /api/admin/member-data
///
/// Every module is present in the response; modules with no saved row are `null`.
pub async fn handle_member_data(
    State(state): State<AppState>,
    Query(query): Query<MemberDataQuery>,
) -> Result<Json<Value>, AppError> {
    let coach_id = required(&query.coach_id, "coach_id")?;
    let member_id = required(&query.member_id, "member_id")?;
    let store = state.store.as_ref();
    let users_table = &state.config.tables.users;

    let coach = require_coach(store, users_table, coach_id).await?;
    let member = require_own_member(store, users_table, &coach, member_id).await?;

    let mut out = Map::new();
    out.insert("memberName".into(), member.name.into());
    out.insert("memberEmail".into(), member.email.into());
    for (module, record) in load_all(store, &state.config.tables, member_id).await {
        let value = record.map_or(Value::Null, |r| r.to_json());
        out.insert(module.as_str().to_string(), value);
    }
    Ok(Json(Value::Object(out)))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    #[serde(default)]
    pub coach_id: String,
    #[serde(default)]
    pub member_email: String,
}

/// POST /api/admin/assign-member
pub async fn handle_assign_member(
    State(state): State<AppState>,
    Json(req): Json<AssignRequest>,
) -> Result<Json<Value>, AppError> {
    let coach_id = required(&req.coach_id, "coach_id")?;
    let member_email = required(&req.member_email, "member_email")?;
    let store = state.store.as_ref();
    let users_table = &state.config.tables.users;

    let coach = require_coach(store, users_table, coach_id).await?;
    let (member, outcome) = assign_member(store, users_table, &coach, member_email).await?;
    if outcome == Assignment::Assign {
        info!(coach_id, member_id = %member.user_id, "Assigned member to coach");
    }

    Ok(Json(json!({
        "success": true,
        "alreadyAssigned": outcome == Assignment::AlreadyAssigned,
        "memberId": member.user_id,
        "memberName": member.name,
    })))
}

/// GET /api/admin/prompt
pub async fn handle_get_prompt(
    State(state): State<AppState>,
    Query(query): Query<CoachQuery>,
) -> Result<Json<PromptSetting>, AppError> {
    let coach_id = required(&query.coach_id, "coach_id")?;
    let coach = require_coach(state.store.as_ref(), &state.config.tables.users, coach_id).await?;
    Ok(Json(PromptSetting::parse(&coach.ai_prompt)))
}

#[derive(Deserialize)]
pub struct SavePromptRequest {
    #[serde(default)]
    pub coach_id: String,
    pub prompt: Option<String>,
}

/// POST /api/admin/prompt
pub async fn handle_save_prompt(
    State(state): State<AppState>,
    Json(req): Json<SavePromptRequest>,
) -> Result<Json<PromptSetting>, AppError> {
    let coach_id = required(&req.coach_id, "coach_id")?;
    let prompt = req
        .prompt
        .ok_or_else(|| AppError::Validation("prompt is required".into()))?;
    let users_table = &state.config.tables.users;
    let coach = require_coach(state.store.as_ref(), users_table, coach_id).await?;

    let setting = PromptSetting::new(prompt);
    let stored = serde_json::to_string(&setting).map_err(anyhow::Error::from)?;
    let mut fields = FlatFields::new();
    fields.insert("ai_prompt".into(), Value::String(stored));
    state
        .store
        .update(users_table, &coach.record_id, fields)
        .await?;
    Ok(Json(setting))
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub coach_id: String,
    #[serde(default)]
    pub member_id: String,
}

/// POST /api/admin/reset-password
///
/// The plaintext is only ever returned here; the users table keeps its hash.
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    let coach_id = required(&req.coach_id, "coach_id")?;
    let member_id = required(&req.member_id, "member_id")?;
    let store = state.store.as_ref();
    let users_table = &state.config.tables.users;

    let coach = require_coach(store, users_table, coach_id).await?;
    let member = require_own_member(store, users_table, &coach, member_id).await?;

    let new_password = generate_reset_password();
    let hash = hash_password_blocking(new_password.clone()).await?;
    let mut fields = FlatFields::new();
    fields.insert("password_hash".into(), Value::String(hash));
    store.update(users_table, &member.record_id, fields).await?;
    info!(coach_id, member_id, "Reset member password");

    Ok(Json(json!({
        "success": true,
        "memberName": member.name,
        "memberEmail": member.email,
        "newPassword": new_password,
    })))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::credentials::{hash_password, verify_password};
    use crate::lark::memory::MemoryStore;
    use crate::routes::build_router;
    use crate::testing::{send_json, test_state};

    fn seed(store: &MemoryStore) {
        store.insert(
            "tbl_users",
            json!({
                "user_id": "c1", "name": "Coach Kai", "email": "kai@example.com",
                "role": "coach", "password_hash": hash_password("coach-pass").unwrap()
            }),
        );
        store.insert("tbl_users", json!({ "user_id": "c2", "role": "coach" }));
        store.insert(
            "tbl_users",
            json!({ "user_id": "m1", "name": "Mio", "email": "mio@example.com", "coach_id": "c1" }),
        );
        store.insert(
            "tbl_users",
            json!({
                "user_id": "m2", "name": "Sora", "email": "sora@example.com",
                "password_hash": hash_password("member-pass").unwrap()
            }),
        );
    }

    #[tokio::test]
    async fn test_admin_login_requires_coach_role() {
        let (state, store) = test_state();
        seed(&store);
        let app = build_router(state);

        let (status, body) = send_json(
            app.clone(),
            "POST",
            "/api/admin/login",
            json!({ "email": "kai@example.com", "password": "coach-pass" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userId"], json!("c1"));
        assert_eq!(body["role"], json!("coach"));

        let (status, _) = send_json(
            app,
            "POST",
            "/api/admin/login",
            json!({ "email": "sora@example.com", "password": "member-pass" }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_verify() {
        let (state, store) = test_state();
        seed(&store);
        let app = build_router(state);

        let (status, body) =
            send_json(app.clone(), "POST", "/api/admin/verify", json!({ "userId": "c1" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], json!(true));
        assert_eq!(body["name"], json!("Coach Kai"));

        let (status, _) =
            send_json(app.clone(), "POST", "/api/admin/verify", json!({ "userId": "m1" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) =
            send_json(app, "POST", "/api/admin/verify", json!({ "userId": "ghost" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_members_lists_only_own() {
        let (state, store) = test_state();
        seed(&store);
        let (status, body) = send_json(
            build_router(state),
            "GET",
            "/api/admin/members?coach_id=c1",
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let members = body["members"].as_array().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["name"], json!("Mio"));
    }

    #[tokio::test]
    async fn test_member_data_checks_relation() {
        let (state, store) = test_state();
        seed(&store);
        store.insert("tbl_passion", json!({ "user_id": "m1", "q11_one_word": "bread" }));
        let app = build_router(state);

        let (status, body) = send_json(
            app.clone(),
            "GET",
            "/api/admin/member-data?coach_id=c1&member_id=m1",
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["memberName"], json!("Mio"));
        assert_eq!(body["passion"]["q11"], json!("bread"));
        assert_eq!(body["passion"]["q7"].as_array().unwrap().len(), 10);
        assert!(body["values"].is_null());
        assert!(body.as_object().unwrap().contains_key("life-manual"));

        let (status, _) = send_json(
            app,
            "GET",
            "/api/admin/member-data?coach_id=c2&member_id=m1",
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_assign_member_routes() {
        let (state, store) = test_state();
        seed(&store);
        let app = build_router(state);

        let (status, body) = send_json(
            app.clone(),
            "POST",
            "/api/admin/assign-member",
            json!({ "coach_id": "c2", "member_email": "sora@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alreadyAssigned"], json!(false));
        assert_eq!(body["memberId"], json!("m2"));

        let (status, body) = send_json(
            app.clone(),
            "POST",
            "/api/admin/assign-member",
            json!({ "coach_id": "c2", "member_email": "sora@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alreadyAssigned"], json!(true));

        let (status, _) = send_json(
            app.clone(),
            "POST",
            "/api/admin/assign-member",
            json!({ "coach_id": "c1", "member_email": "sora@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send_json(
            app,
            "POST",
            "/api/admin/assign-member",
            json!({ "coach_id": "c1", "member_email": "nobody@example.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_prompt_save_then_get() {
        let (state, store) = test_state();
        seed(&store);
        let app = build_router(state);

        let (status, _) = send_json(
            app.clone(),
            "POST",
            "/api/admin/prompt",
            json!({ "coach_id": "c1", "prompt": "Keep it short" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send_json(app.clone(), "GET", "/api/admin/prompt?coach_id=c1", Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prompt"], json!("Keep it short"));
        assert!(body["updatedAt"].is_string());

        let (status, _) =
            send_json(app, "POST", "/api/admin/prompt", json!({ "coach_id": "c1" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reset_password_requires_ownership() {
        let (state, store) = test_state();
        seed(&store);
        let app = build_router(state);

        let (status, _) = send_json(
            app.clone(),
            "POST",
            "/api/admin/reset-password",
            json!({ "coach_id": "c2", "member_id": "m1" }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send_json(
            app,
            "POST",
            "/api/admin/reset-password",
            json!({ "coach_id": "c1", "member_id": "m1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let plain = body["newPassword"].as_str().unwrap();
        assert_eq!(plain.len(), 8);

        let m1 = store
            .rows("tbl_users")
            .into_iter()
            .find(|r| r.fields["user_id"] == json!("m1"))
            .unwrap();
        let stored = m1.fields["password_hash"].as_str().unwrap();
        assert!(verify_password(plain, stored).unwrap());
        assert!(!stored.contains(plain));
    }

    #[tokio::test]
    async fn test_admin_check_uses_fallback_list() {
        let (state, _) = test_state();
        let (status, body) = send_json(
            build_router(state),
            "GET",
            "/api/admin-check?email=Owner@Example.com",
            Value::Null,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["isAdmin"], json!(true));
        assert_eq!(body["source"], json!("default"));
    }
}
