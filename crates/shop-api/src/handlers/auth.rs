//! auth-service handlers
//!
//! Token issue, verification, rotation and revocation.

use axum::extract::State;
use shop_common::AccessClaims;
use shop_service::dto::{
    CreateTokensRequest, PurgeResponse, RefreshTokenRequest, RevokeAllResponse,
    RevokeTokenRequest, RevokeTokenResponse, SessionsResponse, TokenPairResponse,
    VerifyTokenRequest,
};
use shop_service::TokenService;

use crate::extractors::{AuthUser, InternalCaller, ValidatedJson};
use crate::response::{ApiResult, ApiSuccess};
use crate::state::AuthState;

/// Issue a token pair for an already authenticated user
///
/// POST /v1/auth/create-tokens (internal)
pub async fn create_tokens(
    State(state): State<AuthState>,
    _internal: InternalCaller,
    ValidatedJson(request): ValidatedJson<CreateTokensRequest>,
) -> ApiResult<ApiSuccess<TokenPairResponse>> {
    let pair = TokenService::new(state.context())
        .create_token_pair(request)
        .await?;
    Ok(ApiSuccess::created("Tokens created", pair))
}

/// Verify an access token
///
/// POST /v1/auth/verify-token
pub async fn verify_token(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<VerifyTokenRequest>,
) -> ApiResult<ApiSuccess<AccessClaims>> {
    let claims = TokenService::new(state.context()).verify(&request.token)?;
    Ok(ApiSuccess::ok("Token is valid", claims))
}

/// Rotate a refresh token
///
/// POST /v1/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> ApiResult<ApiSuccess<TokenPairResponse>> {
    let pair = TokenService::new(state.context())
        .refresh(&request.refresh_token)
        .await?;
    Ok(ApiSuccess::ok("Token refreshed", pair))
}

/// Revoke one refresh token
///
/// POST /v1/auth/revoke-token
pub async fn revoke_token(
    State(state): State<AuthState>,
    ValidatedJson(request): ValidatedJson<RevokeTokenRequest>,
) -> ApiResult<ApiSuccess<RevokeTokenResponse>> {
    let outcome = TokenService::new(state.context())
        .revoke(&request.refresh_token)
        .await?;
    Ok(ApiSuccess::ok("Token revocation processed", outcome.into()))
}

/// Revoke every refresh token of the caller
///
/// POST /v1/auth/revoke-all
pub async fn revoke_all(
    State(state): State<AuthState>,
    auth: AuthUser,
) -> ApiResult<ApiSuccess<RevokeAllResponse>> {
    let revoked_count = TokenService::new(state.context())
        .revoke_all(auth.user_id())
        .await?;
    Ok(ApiSuccess::ok(
        "All sessions revoked",
        RevokeAllResponse { revoked_count },
    ))
}

/// Number of live refresh tokens of the caller
///
/// GET /v1/auth/sessions
pub async fn sessions(
    State(state): State<AuthState>,
    auth: AuthUser,
) -> ApiResult<ApiSuccess<SessionsResponse>> {
    let active_sessions = TokenService::new(state.context())
        .active_session_count(auth.user_id())
        .await?;
    Ok(ApiSuccess::ok(
        "Active sessions",
        SessionsResponse { active_sessions },
    ))
}

/// Delete expired refresh tokens
///
/// POST /v1/auth/internal/purge-expired (internal)
pub async fn purge_expired(
    State(state): State<AuthState>,
    _internal: InternalCaller,
) -> ApiResult<ApiSuccess<PurgeResponse>> {
    let purged_count = TokenService::new(state.context()).purge_expired().await?;
    Ok(ApiSuccess::ok(
        "Expired tokens purged",
        PurgeResponse { purged_count },
    ))
}
