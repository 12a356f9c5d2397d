//! Route definitions
//!
//! The auth-service mounts its routes under /v1/auth and the user-service
//! under /v1/users. Both expose /health.

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::handlers::{admin, auth, health, users};
use crate::response::not_found;
use crate::state::{AuthState, UserState};

/// auth-service router
pub fn auth_router() -> Router<AuthState> {
    Router::new()
        .route("/health", get(|| health::health_check("auth-service")))
        .nest("/v1/auth", auth_routes())
        .fallback(not_found)
}

/// user-service router
pub fn user_router() -> Router<UserState> {
    Router::new()
        .route("/health", get(|| health::health_check("user-service")))
        .nest("/v1/users", user_routes().merge(admin_routes()))
        .fallback(not_found)
}

fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/create-tokens", post(auth::create_tokens))
        .route("/verify-token", post(auth::verify_token))
        .route("/refresh-token", post(auth::refresh_token))
        .route("/revoke-token", post(auth::revoke_token))
        .route("/revoke-all", post(auth::revoke_all))
        .route("/sessions", get(auth::sessions))
        .route("/internal/purge-expired", post(auth::purge_expired))
}

fn user_routes() -> Router<UserState> {
    Router::new()
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route(
            "/profile",
            get(users::get_profile).patch(users::update_profile),
        )
        .route("/change-password", post(users::change_password))
        .route("/forgot-password", post(users::forgot_password))
        .route("/reset-password", post(users::reset_password))
        .route("/internal/:id", get(users::internal_user))
}

/// Admin-guarded user management
fn admin_routes() -> Router<UserState> {
    Router::new()
        .route("/admin", get(admin::list_users))
        .route(
            "/admin/:id",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::soft_delete_user),
        )
        .route("/admin/:id/restore", post(admin::restore_user))
        .route(
            "/admin/:id/permanent",
            delete(admin::delete_user_permanently),
        )
}
