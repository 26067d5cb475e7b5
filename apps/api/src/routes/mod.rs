pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::admin::handlers as admin;
use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::state::AppState;
use crate::work::handlers as work;

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Sign-in
        .route("/api/auth/login", get(auth::handle_login_url))
        .route("/api/auth/callback", get(auth::handle_callback))
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/member-login", post(auth::handle_member_login))
        .route("/api/auth/sync", post(auth::handle_sync))
        .route("/api/auth/update-avatar", post(auth::handle_update_avatar))
        // Work records
        .route("/api/work/:module", put(work::handle_save_work))
        // Coach console
        .route("/api/admin-check", get(admin::handle_admin_check))
        .route("/api/admin/login", post(admin::handle_admin_login))
        .route("/api/admin/verify", post(admin::handle_verify))
        .route("/api/admin/members", get(admin::handle_members))
        .route("/api/admin/member-data", get(admin::handle_member_data))
        .route("/api/admin/assign-member", post(admin::handle_assign_member))
        .route(
            "/api/admin/prompt",
            get(admin::handle_get_prompt).post(admin::handle_save_prompt),
        )
        .route(
            "/api/admin/reset-password",
            post(admin::handle_reset_password),
        )
        // AI
        .route("/api/ai/analyze", post(analysis::handle_analyze))
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}
