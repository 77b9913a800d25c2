//! Integration tests for signup, approval, and login.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use sqlx::PgPool;

use common::{build_test_app, request, seed_admin};

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_signup_login_requires_approval(pool: PgPool) {
    let app = build_test_app(pool.clone());

    // Sign up a cooperative.
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/v1/auth/signup",
        None,
        Some(json!({
            "cooperative_name": "Mbam Growers",
            "email": "contact@mbam-growers.cm",
            "password": "a-strong-password",
            "contact_number": "612345678",
            "location": "Bafia, Centre"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
    assert!(body["registration_number"]
        .as_str()
        .unwrap()
        .starts_with("COOP-"));
    let user_id = body["user_id"].as_i64().unwrap();

    // Login before approval is refused.
    let login = json!({
        "email": "contact@mbam-growers.cm",
        "password": "a-strong-password"
    });
    let (status, body) = request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(login.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("pending approval"));

    // Admin sees the pending account and approves it.
    let admin_token = seed_admin(&pool).await;
    let (status, body) = request(
        &app,
        Method::GET,
        "/api/v1/admin/cooperatives/pending",
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/api/v1/admin/cooperatives/{user_id}/approve"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Login now succeeds and returns a token.
    let (status, body) = request(&app, Method::POST, "/api/v1/auth/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["role"], "cooperative");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_with_wrong_password_fails(pool: PgPool) {
    let app = build_test_app(pool.clone());
    common::seed_cooperative(&pool, "Login Coop").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({
            "email": "login-coop@coop.cm",
            "password": "wrong-password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("Invalid email or password"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_cooperative_name_is_rejected(pool: PgPool) {
    let app = build_test_app(pool);

    let signup = json!({
        "cooperative_name": "Twice Coop",
        "email": "first@twice.cm",
        "password": "a-strong-password"
    });
    let (status, _) = request(&app, Method::POST, "/api/v1/auth/signup", None, Some(signup)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = request(
        &app,
        Method::POST,
        "/api/v1/auth/signup",
        None,
        Some(json!({
            "cooperative_name": "Twice Coop",
            "email": "second@twice.cm",
            "password": "a-strong-password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_reject_cooperative_callers(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let (_, token) = common::seed_cooperative(&pool, "Ordinary Coop").await;

    let (status, _) = request(
        &app,
        Method::GET,
        "/api/v1/admin/cooperatives/pending",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
