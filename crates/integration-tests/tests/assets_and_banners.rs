//! Static asset guards, banners, and theme activation.

use axum::http::StatusCode;
use serde_json::json;

use stitchpress_integration_tests::TestContext;

#[tokio::test]
async fn test_traversal_filenames_rejected() {
    let ctx = TestContext::new();

    // Percent-encoded separators arrive decoded in the path segment; the
    // asset store must refuse anything that is not a bare filename.
    for name in [
        "..%2Fsecret.png",
        "%2e%2e%2fsecret.png",
        "..%5Csecret.png",
        "%2fetc%2fpasswd",
        "..",
    ] {
        for prefix in ["/api/images", "/attached_assets"] {
            let (status, _) = ctx.get(&format!("{prefix}/{name}"), None).await;
            assert_eq!(
                status,
                StatusCode::BAD_REQUEST,
                "{prefix}/{name} must be rejected"
            );
        }
    }
}

#[tokio::test]
async fn test_missing_asset_is_not_found() {
    let ctx = TestContext::new();
    let (status, _) = ctx.get("/api/images/no-such-file.png", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_banners_filter_inactive() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;

    ctx.post(
        "/api/admin/banners",
        Some(&admin),
        json!({ "title": "Summer sale", "imageUrl": "/api/images/sale.png", "position": 2 }),
    )
    .await;
    ctx.post(
        "/api/admin/banners",
        Some(&admin),
        json!({
            "title": "Draft",
            "imageUrl": "/api/images/draft.png",
            "position": 1,
            "isActive": false
        }),
    )
    .await;

    // Anonymous listing shows only the active banner.
    let (status, public) = ctx.get("/api/banners", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public.as_array().map(Vec::len), Some(1));
    assert_eq!(public[0]["title"], "Summer sale");

    // The admin listing shows both.
    let (_, all) = ctx.get("/api/admin/banners", Some(&admin)).await;
    assert_eq!(all.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_theme_activation_is_exclusive() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;

    let (_, midnight) = ctx
        .post(
            "/api/admin/themes",
            Some(&admin),
            json!({ "name": "midnight", "tokens": { "primary": "#1a1a2e" }, "isActive": true }),
        )
        .await;
    let (_, daylight) = ctx
        .post(
            "/api/admin/themes",
            Some(&admin),
            json!({ "name": "daylight", "tokens": { "primary": "#fafafa" } }),
        )
        .await;
    assert_eq!(midnight["isActive"], true);

    let (status, activated) = ctx
        .post(
            &format!("/api/admin/themes/{}/activate", daylight["id"]),
            Some(&admin),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(activated["isActive"], true);

    let (_, themes) = ctx.get("/api/admin/themes", Some(&admin)).await;
    let active: Vec<_> = themes
        .as_array()
        .expect("theme list")
        .iter()
        .filter(|t| t["isActive"] == true)
        .collect();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["name"], "daylight");
}
