//! Shared helpers for API integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

use harvest_api::auth::jwt::{generate_access_token, JwtConfig};
use harvest_api::auth::password::hash_password;
use harvest_api::config::ServerConfig;
use harvest_api::routes;
use harvest_api::state::AppState;
use harvest_core::types::DbId;
use harvest_db::models::cooperative::CreateCooperative;
use harvest_db::models::user::{CreateUser, ROLE_ADMIN, ROLE_COOPERATIVE};
use harvest_db::repositories::{CooperativeRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults and a fixed JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:4200".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expiry_mins: 60,
        },
    }
}

/// Build the application router with the middleware layers that matter
/// for tests (panic recovery, timeout, request id), using the given pool.
///
/// Mirrors the router construction in `main.rs` so integration tests
/// exercise the same stack production uses (CORS is exercised separately
/// and omitted here to keep request building simple).
pub fn build_test_app(pool: PgPool) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(test_config()),
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state)
}

/// Seed an approved cooperative with a login account, returning
/// `(cooperative_id, bearer_token)`.
pub async fn seed_cooperative(pool: &PgPool, name: &str) -> (DbId, String) {
    let cooperative = CooperativeRepo::create(
        pool,
        &CreateCooperative {
            name: name.to_string(),
            registration_number: format!("REG-{name}"),
            email: format!("{}@coop.cm", name.to_lowercase().replace(' ', "-")),
            contact_number: None,
            address: None,
            region: Some("Centre".to_string()),
        },
    )
    .await
    .expect("create cooperative");

    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{}@coop.cm", name.to_lowercase().replace(' ', "-")),
            password_hash: hash_password("cooperative-password").expect("hash"),
            full_name: format!("{name} Admin"),
            role: ROLE_COOPERATIVE.to_string(),
            cooperative_id: Some(cooperative.id),
        },
    )
    .await
    .expect("create user");
    let user = UserRepo::approve(pool, user.id)
        .await
        .expect("approve user")
        .expect("user exists");

    let token = generate_access_token(user.id, &user.role, &test_config().jwt).expect("token");
    (cooperative.id, token)
}

/// Seed a platform admin account, returning its bearer token.
pub async fn seed_admin(pool: &PgPool) -> String {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: "admin@harvest.cm".to_string(),
            password_hash: hash_password("admin-password").expect("hash"),
            full_name: "Platform Admin".to_string(),
            role: ROLE_ADMIN.to_string(),
            cooperative_id: None,
        },
    )
    .await
    .expect("create admin");

    generate_access_token(user.id, &user.role, &test_config().jwt).expect("token")
}

/// Send one request through the router and return status + parsed JSON
/// body (or `Value::Null` for empty bodies).
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();

    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
