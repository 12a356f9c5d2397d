//! user-service admin handlers

use axum::extract::State;
use shop_service::dto::{AdminUpdateUserRequest, UserListResponse, UserResponse};
use shop_service::UserAdminService;

use crate::extractors::{AdminUser, Pagination, UserIdPath, ValidatedJson};
use crate::response::{ApiResult, ApiSuccess, Empty};
use crate::state::UserState;

/// GET /v1/users/admin
pub async fn list_users(
    State(state): State<UserState>,
    _admin: AdminUser,
    Pagination(params): Pagination,
) -> ApiResult<ApiSuccess<UserListResponse>> {
    let page = UserAdminService::new(state.context()).list(params).await?;
    Ok(ApiSuccess::ok("Users", page))
}

/// GET /v1/users/admin/:id
pub async fn get_user(
    State(state): State<UserState>,
    _admin: AdminUser,
    UserIdPath(id): UserIdPath,
) -> ApiResult<ApiSuccess<UserResponse>> {
    let user = UserAdminService::new(state.context()).get(id).await?;
    Ok(ApiSuccess::ok("User", user))
}

/// PATCH /v1/users/admin/:id
pub async fn update_user(
    State(state): State<UserState>,
    admin: AdminUser,
    UserIdPath(id): UserIdPath,
    ValidatedJson(request): ValidatedJson<AdminUpdateUserRequest>,
) -> ApiResult<ApiSuccess<UserResponse>> {
    let user = UserAdminService::new(state.context())
        .update(admin.user_id(), id, request)
        .await?;
    Ok(ApiSuccess::ok("User updated", user))
}

/// DELETE /v1/users/admin/:id
pub async fn soft_delete_user(
    State(state): State<UserState>,
    admin: AdminUser,
    UserIdPath(id): UserIdPath,
) -> ApiResult<ApiSuccess<Empty>> {
    UserAdminService::new(state.context())
        .soft_delete(admin.user_id(), id)
        .await?;
    Ok(ApiSuccess::message("User deleted"))
}

/// POST /v1/users/admin/:id/restore
pub async fn restore_user(
    State(state): State<UserState>,
    _admin: AdminUser,
    UserIdPath(id): UserIdPath,
) -> ApiResult<ApiSuccess<UserResponse>> {
    let user = UserAdminService::new(state.context()).restore(id).await?;
    Ok(ApiSuccess::ok("User restored", user))
}

/// DELETE /v1/users/admin/:id/permanent
pub async fn delete_user_permanently(
    State(state): State<UserState>,
    admin: AdminUser,
    UserIdPath(id): UserIdPath,
) -> ApiResult<ApiSuccess<Empty>> {
    UserAdminService::new(state.context())
        .delete_permanently(admin.user_id(), id)
        .await?;
    Ok(ApiSuccess::message("User permanently deleted"))
}
