//! Integration tests for the root-level health endpoint.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};
use sqlx::PgPool;

/// GET /health reports ok with a reachable database.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_health_check(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);
    assert!(json["version"].is_string());
}

/// Every response carries a request id from the middleware stack.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_request_id_header(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app, "/health").await;

    assert!(
        response.headers().contains_key("x-request-id"),
        "x-request-id header should be set by the middleware stack"
    );
}
