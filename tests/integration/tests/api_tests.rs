//! API Integration Tests
//!
//! These tests require:
//! - Running PostgreSQL instance
//! - Environment variables: DATABASE_URL
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_data, assert_error, assert_status, check_test_env, fixtures::*, TestStack,
};
use reqwest::StatusCode;
use serde_json::json;

async fn sign_up(stack: &TestStack, prefix: &str) -> (RegisterRequest, UserResponse) {
    let reg = RegisterRequest::unique(prefix);
    let response = stack
        .post("/v1/users/register", &reg)
        .await
        .expect("Request failed");
    let user: UserResponse = assert_data(response, StatusCode::CREATED)
        .await
        .expect("Registration failed");
    (reg, user)
}

async fn login(stack: &TestStack, reg: &RegisterRequest) -> SessionResponse {
    let response = stack
        .post("/v1/users/login", &LoginRequest::from_register(reg))
        .await
        .expect("Request failed");
    assert_data(response, StatusCode::OK)
        .await
        .expect("Login failed")
}

async fn refresh(stack: &TestStack, refresh_token: &str) -> reqwest::Response {
    stack
        .post(
            "/v1/auth/refresh-token",
            &RefreshTokenRequest {
                refresh_token: refresh_token.to_string(),
            },
        )
        .await
        .expect("Request failed")
}

// ============================================================================
// Health Check Tests
// ============================================================================

#[tokio::test]
async fn test_health_check_on_every_service() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    for base in [
        stack.gateway.base_url(),
        stack.auth.base_url(),
        stack.users.base_url(),
    ] {
        let response = stack
            .client
            .get(format!("{base}/health"))
            .send()
            .await
            .expect("Request failed");
        assert_status(response, StatusCode::OK).await.unwrap();
    }
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
async fn test_register_login_and_verify() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (reg, user) = sign_up(&stack, "login").await;
    assert_eq!(user.status, "inactive");
    assert_eq!(user.role, "user");

    let session = login(&stack, &reg).await;
    assert_eq!(session.user.id, user.id);
    assert_eq!(session.user.status, "active");
    assert!(session.expires_in > 0);

    let response = stack
        .post(
            "/v1/auth/verify-token",
            &json!({ "token": session.access_token }),
        )
        .await
        .expect("Request failed");
    let claims: ClaimsResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(claims.id, user.id);
    assert_eq!(claims.email, reg.email);
    assert_eq!(claims.role, "user");

    let response = stack
        .get_auth("/v1/users/profile", &session.access_token)
        .await
        .expect("Request failed");
    let profile: UserResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile.email, reg.email);
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (reg, _) = sign_up(&stack, "wrong-password").await;

    let response = stack
        .post(
            "/v1/users/login",
            &json!({ "email": reg.email, "password": "Wrong0ne!" }),
        )
        .await
        .expect("Request failed");
    let (message, _) = assert_error(response, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(message, "Password is not correct");
}

#[tokio::test]
async fn test_login_with_unknown_email() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let response = stack
        .post(
            "/v1/users/login",
            &json!({ "email": unique_email("ghost"), "password": PASSWORD }),
        )
        .await
        .expect("Request failed");
    let (message, _) = assert_error(response, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(message, "Account does not exist");
}

// ============================================================================
// Refresh Token Tests
// ============================================================================

#[tokio::test]
async fn test_refresh_rotates_the_token() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (reg, user) = sign_up(&stack, "refresh").await;
    let session = login(&stack, &reg).await;

    let pair: TokenPairResponse = assert_data(
        refresh(&stack, &session.refresh_token).await,
        StatusCode::OK,
    )
    .await
    .unwrap();
    assert_ne!(pair.refresh_token, session.refresh_token);

    let response = stack
        .post(
            "/v1/auth/verify-token",
            &json!({ "token": pair.access_token }),
        )
        .await
        .expect("Request failed");
    let claims: ClaimsResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(claims.id, user.id);

    // The rotated-out token is spent
    let (_, code) = assert_error(
        refresh(&stack, &session.refresh_token).await,
        StatusCode::UNAUTHORIZED,
    )
    .await
    .unwrap();
    assert_eq!(code, "TOKEN_REVOKED");

    // The new one still works
    assert_status(refresh(&stack, &pair.refresh_token).await, StatusCode::OK)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_revoke_token_is_idempotent() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (reg, _) = sign_up(&stack, "revoke").await;
    let session = login(&stack, &reg).await;
    let body = json!({ "refreshToken": session.refresh_token });

    let response = stack
        .post("/v1/auth/revoke-token", &body)
        .await
        .expect("Request failed");
    let outcome: serde_json::Value = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(outcome["outcome"], "REVOKED");

    let response = stack
        .post("/v1/auth/revoke-token", &body)
        .await
        .expect("Request failed");
    let outcome: serde_json::Value = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(outcome["outcome"], "TOKEN_ALREADY_REVOKED");

    let (_, code) = assert_error(
        refresh(&stack, &session.refresh_token).await,
        StatusCode::UNAUTHORIZED,
    )
    .await
    .unwrap();
    assert_eq!(code, "TOKEN_REVOKED");
}

#[tokio::test]
async fn test_revoke_all_only_touches_the_caller() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (alice_reg, _) = sign_up(&stack, "alice").await;
    let (bob_reg, _) = sign_up(&stack, "bob").await;

    let alice_first = login(&stack, &alice_reg).await;
    let alice_second = login(&stack, &alice_reg).await;
    let bob = login(&stack, &bob_reg).await;

    let response = stack
        .post_auth("/v1/auth/revoke-all", &alice_first.access_token, &json!({}))
        .await
        .expect("Request failed");
    let revoked: serde_json::Value = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(revoked["revokedCount"], 2);

    for token in [&alice_first.refresh_token, &alice_second.refresh_token] {
        assert_status(refresh(&stack, token).await, StatusCode::UNAUTHORIZED)
            .await
            .unwrap();
    }
    assert_status(refresh(&stack, &bob.refresh_token).await, StatusCode::OK)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_logout_revokes_refresh_token() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (reg, _) = sign_up(&stack, "logout").await;
    let session = login(&stack, &reg).await;

    let response = stack
        .post_auth(
            "/v1/users/logout",
            &session.access_token,
            &json!({ "refreshToken": session.refresh_token }),
        )
        .await
        .expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();

    assert_status(
        refresh(&stack, &session.refresh_token).await,
        StatusCode::UNAUTHORIZED,
    )
    .await
    .unwrap();

    let response = stack
        .get_auth("/v1/users/profile", &session.access_token)
        .await
        .expect("Request failed");
    let profile: UserResponse = assert_data(response, StatusCode::OK).await.unwrap();
    assert_eq!(profile.status, "inactive");
}

// ============================================================================
// Admin Tests
// ============================================================================

#[tokio::test]
async fn test_soft_deleted_user_loses_access_until_restored() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (admin_reg, admin) = sign_up(&stack, "admin").await;
    stack
        .promote_to_admin(&admin.id)
        .await
        .expect("Failed to promote admin");
    let admin_session = login(&stack, &admin_reg).await;
    assert_eq!(admin_session.user.role, "admin");

    let (reg, user) = sign_up(&stack, "deleted").await;
    let session = login(&stack, &reg).await;

    let response = stack
        .delete_auth(
            &format!("/v1/users/admin/{}", user.id),
            &admin_session.access_token,
        )
        .await
        .expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();

    let response = stack
        .post("/v1/users/login", &LoginRequest::from_register(&reg))
        .await
        .expect("Request failed");
    let (message, _) = assert_error(response, StatusCode::UNAUTHORIZED)
        .await
        .unwrap();
    assert_eq!(message, "Account does not exist");

    let (_, code) = assert_error(
        refresh(&stack, &session.refresh_token).await,
        StatusCode::UNAUTHORIZED,
    )
    .await
    .unwrap();
    assert_eq!(code, "ACCOUNT_DOES_NOT_EXIST");

    let response = stack
        .post_auth(
            &format!("/v1/users/admin/{}/restore", user.id),
            &admin_session.access_token,
            &json!({}),
        )
        .await
        .expect("Request failed");
    assert_status(response, StatusCode::OK).await.unwrap();

    login(&stack, &reg).await;
}

#[tokio::test]
async fn test_admin_routes_reject_plain_users() {
    if !check_test_env().await {
        return;
    }

    let stack = TestStack::start().await.expect("Failed to start services");
    let (reg, _) = sign_up(&stack, "plain").await;
    let session = login(&stack, &reg).await;

    let response = stack
        .get_auth("/v1/users/admin", &session.access_token)
        .await
        .expect("Request failed");
    assert_status(response, StatusCode::FORBIDDEN).await.unwrap();
}
