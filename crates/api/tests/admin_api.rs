//! HTTP-level integration tests for admin registration, admin login, and
//! user management.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json, put_json_auth, TEST_SETUP_SECRET,
};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn register_citizen(app: axum::Router, email: &str) -> serde_json::Value {
    let body = serde_json::json!({
        "name": format!("Citizen {email}"),
        "email": email,
        "password": "test_password_123!",
    });
    let response = post_json(app, "/api/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

async fn register_admin(app: axum::Router, email: &str) -> serde_json::Value {
    let body = serde_json::json!({
        "name": format!("Admin {email}"),
        "email": email,
        "password": "admin_password_123!",
        "setup_secret": TEST_SETUP_SECRET,
    });
    let response = post_json(app, "/api/admin/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Registration gate
// ---------------------------------------------------------------------------

/// The right setup secret creates an admin account.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_register_with_secret(pool: PgPool) {
    let app = common::build_test_app(pool);

    let json = register_admin(app, "boss@test.com").await;

    assert_eq!(json["user"]["role"], "admin");
    assert!(json["token"].is_string());
}

/// A wrong setup secret is 403, and no account is created.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_register_wrong_secret(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "name": "Impostor",
        "email": "impostor@test.com",
        "password": "admin_password_123!",
        "setup_secret": "guessed-secret",
    });
    let response = post_json(app.clone(), "/api/admin/register", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The login path confirms nothing was created.
    let body = serde_json::json!({
        "email": "impostor@test.com",
        "password": "admin_password_123!",
    });
    let response = post_json(app, "/api/admin/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Admin login
// ---------------------------------------------------------------------------

/// The admin login issues tokens only for admin accounts.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_login_rejects_citizens(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_citizen(app.clone(), "plain@test.com").await;

    let body = serde_json::json!({
        "email": "plain@test.com",
        "password": "test_password_123!",
    });
    let response = post_json(app, "/api/admin/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Admin login success returns a token with the admin role.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_login_success(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_admin(app.clone(), "login-admin@test.com").await;

    let body = serde_json::json!({
        "email": "login-admin@test.com",
        "password": "admin_password_123!",
    });
    let response = post_json(app, "/api/admin/login", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["role"], "admin");
}

// ---------------------------------------------------------------------------
// User management
// ---------------------------------------------------------------------------

/// Listing users requires the admin role.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_users(pool: PgPool) {
    let app = common::build_test_app(pool);
    let citizen = register_citizen(app.clone(), "listed@test.com").await;
    let admin = register_admin(app.clone(), "lister@test.com").await;

    let response = get_auth(
        app.clone(),
        "/api/admin/users",
        citizen["token"].as_str().unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/admin/users", admin["token"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

/// Admins can update a user's name and role.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let citizen = register_citizen(app.clone(), "promote@test.com").await;
    let admin = register_admin(app.clone(), "promoter@test.com").await;
    let token = admin["token"].as_str().unwrap();
    let uri = format!("/api/admin/users/{}", citizen["user"]["id"]);

    let body = serde_json::json!({ "role": "superuser" });
    let response = put_json_auth(app.clone(), &uri, body, token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = serde_json::json!({ "name": "Promoted", "role": "admin" });
    let response = put_json_auth(app, &uri, body, token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "Promoted");
    assert_eq!(json["data"]["role"], "admin");
}

/// Deleting a user works, but self-deletion is refused.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_user(pool: PgPool) {
    let app = common::build_test_app(pool);
    let citizen = register_citizen(app.clone(), "deletable@test.com").await;
    let admin = register_admin(app.clone(), "deleter@test.com").await;
    let token = admin["token"].as_str().unwrap();

    let uri = format!("/api/admin/users/{}", admin["user"]["id"]);
    let response = delete_auth(app.clone(), &uri, token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let uri = format!("/api/admin/users/{}", citizen["user"]["id"]);
    let response = delete_auth(app.clone(), &uri, token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app, &uri, token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
