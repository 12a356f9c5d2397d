//! user-service router tests over in-memory stores

mod common;

use axum::http::{Method, StatusCode};
use common::{
    error_code, issue_tokens, promote_to_admin, register, send, services, str_field,
    TestRequest, PASSWORD,
};
use serde_json::{json, Value};

fn login(email: &str, password: &str) -> TestRequest {
    TestRequest::post("/v1/users/login")
        .internal()
        .json(json!({ "email": email, "password": password }))
}

fn admin_request(method: Method, uri: &str, admin: &Value) -> TestRequest {
    TestRequest::new(method, uri).identity(admin)
}

#[tokio::test]
async fn test_health() {
    let services = services();
    let (status, body) = send(&services.users, TestRequest::get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service"], "user-service");
}

#[tokio::test]
async fn test_register_returns_public_user() {
    let services = services();
    let user = register(&services, "Mixed@Example.com").await;

    assert_eq!(user["email"], "mixed@example.com");
    assert_eq!(user["role"], "user");
    assert_eq!(user["status"], "inactive");
    assert!(user.get("passwordHash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email_is_409() {
    let services = services();
    register(&services, "a@example.com").await;

    let (status, body) = send(
        &services.users,
        TestRequest::post("/v1/users/register").json(json!({
            "email": "A@example.com",
            "password": PASSWORD,
            "fullName": "Again",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "EMAIL_ALREADY_EXISTS");
}

#[tokio::test]
async fn test_register_rejects_invalid_body() {
    let services = services();
    let (status, body) = send(
        &services.users,
        TestRequest::post("/v1/users/register").json(json!({
            "email": "not-an-email",
            "password": PASSWORD,
            "fullName": "X",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");

    let (status, body) = send(
        &services.users,
        TestRequest::post("/v1/users/register").json(json!({
            "email": "weak@example.com",
            "password": "alllowercase",
            "fullName": "X",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "WEAK_PASSWORD");
}

#[tokio::test]
async fn test_login_requires_internal_token() {
    let services = services();
    register(&services, "a@example.com").await;

    let (status, _) = send(
        &services.users,
        TestRequest::post("/v1/users/login")
            .json(json!({ "email": "a@example.com", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_marks_user_active() {
    let services = services();
    register(&services, "a@example.com").await;

    let (status, body) = send(&services.users, login("a@example.com", PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["status"], "active");
    assert!(body["data"]["user"]["lastLoginAt"].is_string());
}

#[tokio::test]
async fn test_login_failures() {
    let services = services();
    register(&services, "a@example.com").await;

    let (status, body) = send(&services.users, login("a@example.com", "Wrong12345")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Password is not correct");

    let (status, body) = send(&services.users, login("nobody@example.com", PASSWORD)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account does not exist");
}

#[tokio::test]
async fn test_profile_needs_identity_headers() {
    let services = services();
    let (status, _) = send(&services.users, TestRequest::get("/v1/users/profile")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = register(&services, "a@example.com").await;
    let (status, body) = send(
        &services.users,
        TestRequest::get("/v1/users/profile").identity(&user),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user["id"]);
}

#[tokio::test]
async fn test_profile_with_non_ascii_email() {
    let services = services();
    let user = register(&services, "shopper@bücher.de").await;
    assert_eq!(user["email"], "shopper@bücher.de");

    let (status, body) = send(
        &services.users,
        TestRequest::get("/v1/users/profile").identity(&user),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["email"], "shopper@bücher.de");
}

#[tokio::test]
async fn test_update_profile_and_change_password() {
    let services = services();
    let user = register(&services, "a@example.com").await;

    let (status, body) = send(
        &services.users,
        TestRequest::new(Method::PATCH, "/v1/users/profile")
            .identity(&user)
            .json(json!({ "fullName": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["fullName"], "Renamed");

    let (status, body) = send(
        &services.users,
        TestRequest::post("/v1/users/change-password")
            .identity(&user)
            .json(json!({ "currentPassword": PASSWORD, "newPassword": "NewPassword456" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"], json!({}));

    let (status, _) = send(&services.users, login("a@example.com", PASSWORD)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = send(&services.users, login("a@example.com", "NewPassword456")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_is_silent_for_unknown_email() {
    let services = services();
    let (status, body) = send(
        &services.users,
        TestRequest::post("/v1/users/forgot-password")
            .json(json!({ "email": "nobody@example.com" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_reset_password_with_unknown_token() {
    let services = services();
    let (status, body) = send(
        &services.users,
        TestRequest::post("/v1/users/reset-password")
            .json(json!({ "token": "bogus", "newPassword": "NewPassword456" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_RESET_TOKEN");
}

#[tokio::test]
async fn test_internal_lookup() {
    let services = services();
    let user = register(&services, "a@example.com").await;
    let uri = format!("/v1/users/internal/{}", str_field(&user, "id"));

    let (status, _) = send(&services.users, TestRequest::get(&uri)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&services.users, TestRequest::get(&uri).internal()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "a@example.com");
    assert_eq!(body["data"]["status"], "inactive");

    let (status, _) = send(
        &services.users,
        TestRequest::get("/v1/users/internal/not-a-uuid").internal(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_routes_refuse_plain_users() {
    let services = services();
    let user = register(&services, "a@example.com").await;

    let (status, body) = send(
        &services.users,
        admin_request(Method::GET, "/v1/users/admin", &user),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "INSUFFICIENT_PERMISSIONS");
}

#[tokio::test]
async fn test_admin_lists_users() {
    let services = services();
    let admin = register(&services, "admin@example.com").await;
    let admin = promote_to_admin(&services, &admin).await;
    register(&services, "b@example.com").await;

    let (status, body) = send(
        &services.users,
        admin_request(Method::GET, "/v1/users/admin?page=1&limit=10", &admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["limit"], 10);
}

#[tokio::test]
async fn test_admin_cannot_demote_or_delete_self() {
    let services = services();
    let admin = register(&services, "admin@example.com").await;
    let admin = promote_to_admin(&services, &admin).await;
    let uri = format!("/v1/users/admin/{}", str_field(&admin, "id"));

    let (status, body) = send(
        &services.users,
        admin_request(Method::PATCH, &uri, &admin).json(json!({ "role": "user" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "CANNOT_MODIFY_SELF");

    let (status, _) = send(&services.users, admin_request(Method::DELETE, &uri, &admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_soft_delete_hides_user_until_restored() {
    let services = services();
    let admin = register(&services, "admin@example.com").await;
    let admin = promote_to_admin(&services, &admin).await;
    let user = register(&services, "a@example.com").await;
    let pair = issue_tokens(&services, &user).await;
    let uri = format!("/v1/users/admin/{}", str_field(&user, "id"));

    let (status, _) = send(&services.users, admin_request(Method::DELETE, &uri, &admin)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&services.users, login("a@example.com", PASSWORD)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Account does not exist");

    let (status, body) = send(
        &services.auth,
        TestRequest::post("/v1/auth/refresh-token")
            .json(json!({ "refreshToken": pair["refreshToken"] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "ACCOUNT_DOES_NOT_EXIST");

    let (status, body) = send(
        &services.users,
        admin_request(Method::POST, &format!("{uri}/restore"), &admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("deletedAt").is_none());

    let (status, _) = send(&services.users, login("a@example.com", PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_blocked_user_cannot_refresh() {
    let services = services();
    let admin = register(&services, "admin@example.com").await;
    let admin = promote_to_admin(&services, &admin).await;
    let user = register(&services, "a@example.com").await;
    let pair = issue_tokens(&services, &user).await;
    let uri = format!("/v1/users/admin/{}", str_field(&user, "id"));

    let (status, body) = send(
        &services.users,
        admin_request(Method::PATCH, &uri, &admin).json(json!({ "status": "blocked" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = send(
        &services.auth,
        TestRequest::post("/v1/auth/refresh-token")
            .json(json!({ "refreshToken": pair["refreshToken"] })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "ACCOUNT_BLOCKED");
}
