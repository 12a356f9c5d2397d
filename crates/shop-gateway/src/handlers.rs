//! Routes the gateway answers by composing several backend calls

use axum::{extract::State, http::HeaderMap};
use reqwest::Method;
use shop_api::extractors::{AuthUser, OptionalValidatedJson, ValidatedJson};
use shop_api::response::{ApiResult, ApiSuccess, Empty};
use shop_common::{GatewayIdentity, INTERNAL_TOKEN_HEADER};
use shop_service::dto::{
    CreateTokensRequest, LoginRequest, LoginResponse, LogoutRequest, RevokeTokenRequest,
    RevokeTokenResponse, SessionResponse, TokenPairResponse,
};
use tracing::{debug, info};

use crate::proxy::with_request_id;
use crate::state::GatewayState;

/// Credential check at the user-service, then token issue at the auth-service
///
/// POST /v1/users/login
pub async fn login(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<ApiSuccess<SessionResponse>> {
    let users = state.users();
    let LoginResponse { user } = users
        .call::<LoginResponse>(
            with_request_id(users.request(Method::POST, "/v1/users/login"), &headers)
                .header(INTERNAL_TOKEN_HEADER, state.internal_token())
                .json(&request),
        )
        .await?;

    let auth = state.auth();
    let issue = CreateTokensRequest {
        id: Some(user.id.to_string()),
        email: user.email.clone(),
        role: user.role,
    };
    let tokens: TokenPairResponse = auth
        .call(
            with_request_id(auth.request(Method::POST, "/v1/auth/create-tokens"), &headers)
                .header(INTERNAL_TOKEN_HEADER, state.internal_token())
                .json(&issue),
        )
        .await?;

    info!(user_id = %user.id, "Session opened");
    Ok(ApiSuccess::ok("Login successful", SessionResponse { user, tokens }))
}

/// Revoke the presented refresh token, then mark the user inactive
///
/// POST /v1/users/logout
pub async fn logout(
    State(state): State<GatewayState>,
    caller: AuthUser,
    headers: HeaderMap,
    OptionalValidatedJson(request): OptionalValidatedJson<LogoutRequest>,
) -> ApiResult<ApiSuccess<Empty>> {
    if let Some(refresh_token) = request.and_then(|r| r.refresh_token) {
        let auth = state.auth();
        let revoked: RevokeTokenResponse = auth
            .call(
                with_request_id(auth.request(Method::POST, "/v1/auth/revoke-token"), &headers)
                    .json(&RevokeTokenRequest { refresh_token }),
            )
            .await?;
        debug!(outcome = %revoked.outcome, "Refresh token revoked on logout");
    }

    let identity = GatewayIdentity(caller.claims.subject());
    let users = state.users();
    let mut builder = with_request_id(users.request(Method::POST, "/v1/users/logout"), &headers);
    for (name, value) in identity.header_values() {
        builder = builder.header(name, value);
    }
    users.call::<serde_json::Value>(builder).await?;

    info!(user_id = %identity.user_id(), "Session closed");
    Ok(ApiSuccess::message("Logout successful"))
}
