//! Integration test harness for Stitchpress.
//!
//! Drives the full axum router in-process over the in-memory store: no
//! network, no database, no running server. Each [`TestContext`] is a
//! fully isolated application instance.
//!
//! ```rust,ignore
//! let ctx = TestContext::new();
//! let (status, body) = ctx
//!     .post("/api/auth/signup", None, json!({ ... }))
//!     .await;
//! assert_eq!(status, StatusCode::CREATED);
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use stitchpress_core::UserRole;
use stitchpress_server::config::{AppEnv, Config};
use stitchpress_server::routes;
use stitchpress_server::services::{AssetStore, CleanupQueue, TokenService};
use stitchpress_server::state::AppState;
use stitchpress_server::store::{MemStore, Store};

/// An isolated in-process application instance.
pub struct TestContext {
    app: Router,
    store: Arc<MemStore>,
}

impl TestContext {
    /// Build a fresh application over an empty in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the temporary upload directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let upload_dir = std::env::temp_dir().join(format!("stitchpress-it-{}", Uuid::new_v4()));
        let config = Config {
            env: AppEnv::Development,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            database_url: None,
            jwt_secret: SecretString::from("integration-test-signing-key-0123456789".to_owned()),
            upload_dir: upload_dir.clone(),
            sentry_dsn: None,
        };

        let store = Arc::new(MemStore::new());
        let tokens = TokenService::new(config.jwt_secret.clone());
        let assets = AssetStore::new(upload_dir).expect("create upload dir");
        let (cleanup, _worker) =
            CleanupQueue::spawn(Arc::clone(&store) as Arc<dyn Store>);

        let state = AppState::new(
            config,
            Arc::clone(&store) as Arc<dyn Store>,
            tokens,
            assets,
            cleanup,
        );
        Self {
            app: routes::router(state),
            store,
        }
    }

    /// Direct handle to the backing store, for seeding and assertions.
    #[must_use]
    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// Send a request and decode the JSON response body (or `Value::Null`
    /// for empty bodies).
    ///
    /// # Panics
    ///
    /// Panics on transport-level failures; those are test bugs.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails at the transport level");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Sign up a fresh user and return their bearer token.
    ///
    /// # Panics
    ///
    /// Panics if signup does not succeed.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/signup",
                None,
                json!({ "email": email, "password": password, "name": name }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["token"].as_str().expect("token in response").to_owned()
    }

    /// Sign up a user, promote them to admin, and log in again so the
    /// token carries the admin role.
    ///
    /// # Panics
    ///
    /// Panics if any step fails.
    pub async fn signup_admin(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/auth/signup",
                None,
                json!({ "email": email, "password": password, "name": "Admin" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

        #[allow(clippy::cast_possible_truncation)]
        let id = stitchpress_core::UserId::new(body["user"]["id"].as_i64().expect("id") as i32);
        self.store
            .set_user_role(id, UserRole::Admin)
            .await
            .expect("promote to admin");

        let (status, body) = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["token"].as_str().expect("token in response").to_owned()
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// A small PNG logo as a base64 data URI, for design uploads.
///
/// # Panics
///
/// Panics if in-memory PNG encoding fails.
#[must_use]
pub fn logo_data_uri() -> String {
    use base64::Engine;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 32, Rgba([220, 30, 30, 255])))
        .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode logo");
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&bytes)
    )
}
