//! Security tests for tandem-server
//!
//! Tests security-critical features:
//! - Request body size limit
//! - Session check runs before the body is read
//! - Error bodies never leak storage detail or account existence

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tandem_common::db::open_in_memory;
use tandem_server::{build_router, AppState, MAX_BODY_BYTES};
use tower::util::ServiceExt;

/// Test helper: app over a fresh in-memory database
async fn setup_app() -> Router {
    let pool = open_in_memory().await.expect("Should open in-memory database");
    build_router(AppState::new(pool, 12345))
}

fn oversized_json() -> Vec<u8> {
    // Valid JSON, just too long
    let padding = "x".repeat(MAX_BODY_BYTES + 1024);
    format!(r#"{{"email":"a@example.com","displayName":"{}"}}"#, padding).into_bytes()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Bodies over the limit are rejected without being parsed
#[tokio::test]
async fn test_body_size_limit() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(oversized_json()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert!(body["error"].is_string());
}

/// Bodies under the limit are not rejected for size
#[tokio::test]
async fn test_body_under_limit_accepted() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"email":"a@example.com","displayName":"A","natives":["en"],"targets":["zh"]}"#,
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

/// A protected route answers 401 before looking at the body at all
#[tokio::test]
async fn test_unauthenticated_before_body() {
    let app = setup_app().await;

    let request = Request::builder()
        .method("PUT")
        .uri("/api/me/languages")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{definitely not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// 401 bodies carry a fixed message, whatever the underlying reason
#[tokio::test]
async fn test_unauthorized_message_is_generic() {
    let app = setup_app().await;

    for token in ["", "abc", "1.1.deadbeef"] {
        let request = Request::builder()
            .method("GET")
            .uri("/api/me")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "Unauthorized");
    }
}

/// Unknown e-mail and wrong password are indistinguishable at login
#[tokio::test]
async fn test_login_failures_look_alike() {
    let app = setup_app().await;

    let signup = Request::builder()
        .method("POST")
        .uri("/api/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"email":"bob@example.com","displayName":"Bob","password":"secret-pw"}"#,
        ))
        .unwrap();
    assert_eq!(app.clone().oneshot(signup).await.unwrap().status(), StatusCode::CREATED);

    let login = |body: &'static str| {
        Request::builder()
            .method("POST")
            .uri("/api/session")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap()
    };

    let wrong_password = app
        .clone()
        .oneshot(login(r#"{"email":"bob@example.com","password":"nope"}"#))
        .await
        .unwrap();
    let unknown_email = app
        .clone()
        .oneshot(login(r#"{"email":"ghost@example.com","password":"nope"}"#))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(wrong_password).await, json_body(unknown_email).await);
}
