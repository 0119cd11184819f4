//! Custom design lifecycle: add, finish (compose), edit (reopen).

use axum::http::StatusCode;
use serde_json::{Value, json};

use stitchpress_integration_tests::{TestContext, logo_data_uri};

async fn add_custom_line(ctx: &TestContext, token: &str, image: &str) -> Value {
    let (status, body) = ctx
        .post(
            "/api/cart",
            Some(token),
            json!({
                "quantity": 1,
                "customDesign": {
                    "scale": 120,
                    "rotation": 45.0,
                    "x": 10,
                    "y": -10,
                    "image": image,
                    "color": "black",
                    "size": "L",
                    "price": "599"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "add failed: {body}");
    body
}

#[tokio::test]
async fn test_inline_logo_is_persisted_to_asset_store() {
    let ctx = TestContext::new();
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    let item = add_custom_line(&ctx, &user, &logo_data_uri()).await;
    let image = item["design"]["image"].as_str().expect("image url");
    assert!(image.starts_with("/api/images/"), "data uri must be stored: {image}");

    // And the stored logo is fetchable.
    let (status, _) = ctx.get(image, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_finish_sets_composite_then_edit_clears_it() {
    let ctx = TestContext::new();
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let item = add_custom_line(&ctx, &user, &logo_data_uri()).await;
    let id = item["id"].as_i64().expect("item id");

    let (status, finished) = ctx
        .post(&format!("/api/cart/{id}/design/finish"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK, "finish failed: {finished}");
    assert_eq!(finished["design"]["isFinished"], true);
    let composite = finished["design"]["compositeImageUrl"]
        .as_str()
        .expect("composite url");
    assert!(composite.starts_with("/api/images/"));

    // The composite is a decodable stored PNG.
    let (status, _) = ctx.get(composite, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, reopened) = ctx
        .post(&format!("/api/cart/{id}/design/edit"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reopened["design"]["isFinished"], false);
    assert!(reopened["design"]["compositeImageUrl"].is_null());
}

#[tokio::test]
async fn test_finish_without_logo_rejected() {
    let ctx = TestContext::new();
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;
    let item = add_custom_line(&ctx, &user, "").await;
    let id = item["id"].as_i64().expect("item id");

    let (status, body) = ctx
        .post(&format!("/api/cart/{id}/design/finish"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "no design uploaded");
}

#[tokio::test]
async fn test_out_of_range_transform_rejected() {
    let ctx = TestContext::new();
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    let (status, _) = ctx
        .post(
            "/api/cart",
            Some(&user),
            json!({
                "quantity": 1,
                "customDesign": {
                    "scale": 300,
                    "rotation": 0.0,
                    "x": 0,
                    "y": 0,
                    "image": logo_data_uri(),
                    "color": "black",
                    "size": "L",
                    "price": "599"
                }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_finish_on_product_line_rejected() {
    let ctx = TestContext::new();
    let admin = ctx.signup_admin("root@example.com", "hunter22hunter").await;
    let user = ctx.signup("ana@example.com", "hunter22hunter", "Ana").await;

    let (_, product) = ctx
        .post(
            "/api/products",
            Some(&admin),
            json!({ "slug": "tee", "name": "tee", "description": "", "price": "200" }),
        )
        .await;
    let (_, item) = ctx
        .post(
            "/api/cart",
            Some(&user),
            json!({ "productId": product["id"], "quantity": 1 }),
        )
        .await;
    let id = item["id"].as_i64().expect("item id");

    let (status, _) = ctx
        .post(&format!("/api/cart/{id}/design/finish"), Some(&user), json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
