//! Cart mutations and checkout totals through the HTTP surface.

use axum::http::StatusCode;
use serde_json::{Value, json};

use stitchpress_integration_tests::TestContext;

async fn seed_product(ctx: &TestContext, admin: &str, slug: &str, price: &str) -> Value {
    let (status, body) = ctx
        .post(
            "/api/products",
            Some(admin),
            json!({
                "slug": slug,
                "name": slug,
                "description": "test product",
                "price": price,
                "images": [format!("/api/images/{slug}.png")],
                "sizes": ["M", "L"],
                "colors": ["black"],
                "inventory": 5
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "seed failed: {body}");
    body
}

const ADDRESS: &str = r#"{
    "label": "home",
    "fullName": "Ana Rao",
    "phone": "9999999999",
    "line1": "12 Lake Rd",
    "city": "Pune",
    "state": "MH",
    "pincode": "411001",
    "isDefault": true
}"#;

async fn checkout(ctx: &TestContext, token: &str) -> (StatusCode, Value) {
    let address: Value = serde_json::from_str(ADDRESS).expect("address json");
    ctx.post(
        "/api/orders",
        Some(token),
        json!({ "shippingAddress": address, "paymentStatus": "paid" }),
    )
    .await
}

#[tokio::test]
async fn test_shipping_fee_below_threshold() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let tee = seed_product(&ctx, &admin, "tee", "200").await;
    let cap = seed_product(&ctx, &admin, "cap", "250").await;

    for product in [&tee, &cap] {
        let (status, _) = ctx
            .post(
                "/api/cart",
                Some(&user),
                json!({ "productId": product["id"], "quantity": 1, "size": "M" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    // 450 subtotal picks up the flat 50 fee.
    let (status, order) = checkout(&ctx, &user).await;
    assert_eq!(status, StatusCode::CREATED, "checkout failed: {order}");
    assert_eq!(order["total"], "500");
    assert_eq!(order["status"], "pending");

    // The cart is empty afterwards.
    let (_, cart) = ctx.get("/api/cart", Some(&user)).await;
    assert_eq!(cart.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_free_shipping_at_threshold() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let hoodie = seed_product(&ctx, &admin, "hoodie", "600").await;

    let (status, _) = ctx
        .post(
            "/api/cart",
            Some(&user),
            json!({ "productId": hoodie["id"], "quantity": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, order) = checkout(&ctx, &user).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["total"], "600");
}

#[tokio::test]
async fn test_empty_cart_checkout_rejected() {
    let ctx = TestContext::new();
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let (status, _) = checkout(&ctx, &user).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cart_line_needs_product_or_design() {
    let ctx = TestContext::new();
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    let (status, body) = ctx
        .post("/api/cart", Some(&user), json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
}

#[tokio::test]
async fn test_zero_quantity_update_rejected_and_unchanged() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let tee = seed_product(&ctx, &admin, "tee", "200").await;

    let (_, item) = ctx
        .post(
            "/api/cart",
            Some(&user),
            json!({ "productId": tee["id"], "quantity": 2 }),
        )
        .await;
    let item_id = item["id"].as_i64().expect("item id");

    let (status, _) = ctx
        .put(
            &format!("/api/cart/{item_id}"),
            Some(&user),
            json!({ "quantity": 0 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, cart) = ctx.get("/api/cart", Some(&user)).await;
    assert_eq!(cart[0]["quantity"], 2);
}

#[tokio::test]
async fn test_remove_missing_line_is_not_found() {
    let ctx = TestContext::new();
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    let (status, _) = ctx.delete("/api/cart/999", Some(&user)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Clearing an already-empty cart is fine.
    let (status, _) = ctx.delete("/api/cart", Some(&user)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_cart_isolation_between_users() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;
    let ana = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let bo = ctx.signup("bo@example.com", "hunter22hunter", "Bo").await;
    let tee = seed_product(&ctx, &admin, "tee", "200").await;

    let (_, item) = ctx
        .post(
            "/api/cart",
            Some(&ana),
            json!({ "productId": tee["id"], "quantity": 1 }),
        )
        .await;
    let item_id = item["id"].as_i64().expect("item id");

    // Bo cannot see or touch Ana's line.
    let (_, bo_cart) = ctx.get("/api/cart", Some(&bo)).await;
    assert_eq!(bo_cart.as_array().map(Vec::len), Some(0));
    let (status, _) = ctx.delete(&format!("/api/cart/{item_id}"), Some(&bo)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_snapshot_survives_catalog_edit() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let tee = seed_product(&ctx, &admin, "tee", "600").await;

    ctx.post(
        "/api/cart",
        Some(&user),
        json!({ "productId": tee["id"], "quantity": 1 }),
    )
    .await;
    let (_, order) = checkout(&ctx, &user).await;

    // Reprice the product afterwards; the order keeps its snapshot.
    let (status, _) = ctx
        .put(
            &format!("/api/products/{}", tee["id"]),
            Some(&admin),
            json!({
                "slug": "tee",
                "name": "tee",
                "description": "repriced",
                "price": "9999",
                "inventory": 5
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, fetched) = ctx
        .get(&format!("/api/orders/{}", order["id"]), Some(&user))
        .await;
    assert_eq!(fetched["items"][0]["price"], "600");
    assert_eq!(fetched["total"], "600");
}
