//! user-service handlers for the caller's own account

use axum::extract::State;
use shop_service::dto::{
    ChangePasswordRequest, ForgotPasswordRequest, InternalUserResponse, LoginRequest,
    LoginResponse, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest, UserResponse,
};
use shop_service::AccountService;

use crate::extractors::{IdentityUser, InternalCaller, UserIdPath, ValidatedJson};
use crate::response::{ApiResult, ApiSuccess, Empty};
use crate::state::UserState;

/// Register a new user
///
/// POST /v1/users/register
pub async fn register(
    State(state): State<UserState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<ApiSuccess<UserResponse>> {
    let user = AccountService::new(state.context()).register(request).await?;
    Ok(ApiSuccess::created("User registered", user))
}

/// Verify credentials. The gateway pairs this with token issue.
///
/// POST /v1/users/login (internal)
pub async fn login(
    State(state): State<UserState>,
    _internal: InternalCaller,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiSuccess<LoginResponse>> {
    let login = AccountService::new(state.context()).login(request).await?;
    Ok(ApiSuccess::ok("Login successful", login))
}

/// Mark the caller inactive
///
/// POST /v1/users/logout
pub async fn logout(
    State(state): State<UserState>,
    identity: IdentityUser,
) -> ApiResult<ApiSuccess<Empty>> {
    AccountService::new(state.context())
        .logout(identity.user_id())
        .await?;
    Ok(ApiSuccess::message("Logout successful"))
}

/// GET /v1/users/profile
pub async fn get_profile(
    State(state): State<UserState>,
    identity: IdentityUser,
) -> ApiResult<ApiSuccess<UserResponse>> {
    let user = AccountService::new(state.context())
        .profile(identity.user_id())
        .await?;
    Ok(ApiSuccess::ok("Profile", user))
}

/// PATCH /v1/users/profile
pub async fn update_profile(
    State(state): State<UserState>,
    identity: IdentityUser,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> ApiResult<ApiSuccess<UserResponse>> {
    let user = AccountService::new(state.context())
        .update_profile(identity.user_id(), request)
        .await?;
    Ok(ApiSuccess::ok("Profile updated", user))
}

/// POST /v1/users/change-password
pub async fn change_password(
    State(state): State<UserState>,
    identity: IdentityUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<ApiSuccess<Empty>> {
    AccountService::new(state.context())
        .change_password(identity.user_id(), request)
        .await?;
    Ok(ApiSuccess::message("Password changed"))
}

/// POST /v1/users/forgot-password
pub async fn forgot_password(
    State(state): State<UserState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<ApiSuccess<Empty>> {
    AccountService::new(state.context())
        .forgot_password(request)
        .await?;
    Ok(ApiSuccess::message(
        "If the account exists, a reset token has been sent",
    ))
}

/// POST /v1/users/reset-password
pub async fn reset_password(
    State(state): State<UserState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<ApiSuccess<Empty>> {
    AccountService::new(state.context())
        .reset_password(request)
        .await?;
    Ok(ApiSuccess::message("Password has been reset"))
}

/// Identity and status of a user, for the auth-service
///
/// GET /v1/users/internal/:id (internal)
pub async fn internal_user(
    State(state): State<UserState>,
    _internal: InternalCaller,
    UserIdPath(id): UserIdPath,
) -> ApiResult<ApiSuccess<InternalUserResponse>> {
    let user = AccountService::new(state.context()).internal_user(id).await?;
    Ok(ApiSuccess::ok("User", user))
}
