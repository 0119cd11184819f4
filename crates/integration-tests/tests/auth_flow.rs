//! Signup, login, and role gating through the HTTP surface.

use axum::http::StatusCode;
use serde_json::json;

use stitchpress_integration_tests::TestContext;

#[tokio::test]
async fn test_signup_returns_token_and_sanitized_user() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .post(
            "/api/auth/signup",
            None,
            json!({ "email": "ana@example.com", "password": "hunter22hunter", "name": "Ana" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "ana@example.com");
    assert_eq!(body["user"]["role"], "user");
    // The hash must never appear in any response shape.
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let ctx = TestContext::new();
    ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    let (status, _) = ctx
        .post(
            "/api/auth/signup",
            None,
            json!({ "email": "ana@example.com", "password": "other-password", "name": "Dup" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_failure_message_is_uniform() {
    let ctx = TestContext::new();
    ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    let (wrong_pw_status, wrong_pw) = ctx
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ana@example.com", "password": "not-it" }),
        )
        .await;
    let (no_user_status, no_user) = ctx
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ghost@example.com", "password": "not-it" }),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw["message"], "Invalid credentials");
    assert_eq!(wrong_pw["message"], no_user["message"]);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let ctx = TestContext::new();
    let (status, _) = ctx.get("/api/cart", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.get("/api/cart", Some("garbage.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_forbidden_for_users() {
    let ctx = TestContext::new();
    let token = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    for uri in [
        "/api/admin/orders",
        "/api/admin/users",
        "/api/admin/banners",
        "/api/admin/themes",
    ] {
        let (status, _) = ctx.get(uri, Some(&token)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri} must be admin-only");
    }

    // And without any token it is 401, not 403.
    let (status, _) = ctx.get("/api/admin/orders", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_token_passes_gating() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;

    let (status, body) = ctx.get("/api/admin/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}
