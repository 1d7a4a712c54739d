use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::helpers::{register_and_login, spawn_app};

#[tokio::test]
async fn registering_returns_201_and_no_password_fields() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/auth/register"))
        .json(&json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "correct-horse"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn registering_duplicate_email_returns_400() {
    let app = spawn_app().await;
    let client = Client::new();

    let payload = json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": "correct-horse"
    });

    let first = client
        .post(app.api_url("/auth/register"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(app.api_url("/auth/register"))
        .json(&json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "correct-horse"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registering_with_invalid_email_returns_400() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/auth/register"))
        .json(&json!({
            "username": "bob",
            "email": "not-an-email",
            "password": "correct-horse"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registering_with_short_password_returns_400() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/auth/register"))
        .json(&json!({
            "username": "bob",
            "email": "bob@example.com",
            "password": "abc"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_wrong_password_returns_401() {
    let app = spawn_app().await;
    let client = Client::new();

    register_and_login(&app, "carol").await;

    let response = client
        .post(app.api_url("/auth/login"))
        .json(&json!({ "email": "carol@example.com", "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_with_unknown_email_returns_401() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/auth/login"))
        .json(&json!({ "email": "ghost@example.com", "password": "whatever-pass" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn email_is_matched_case_insensitively_at_login() {
    let app = spawn_app().await;
    let client = Client::new();

    register_and_login(&app, "dave").await;

    let response = client
        .post(app.api_url("/auth/login"))
        .json(&json!({ "email": "DAVE@Example.Com", "password": "hunter2hunter2" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_route_rejects_missing_token() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(app.api_url("/users/profile"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_rejects_garbage_token() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(app.api_url("/users/profile"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn legacy_token_header_is_accepted() {
    let app = spawn_app().await;
    let client = Client::new();

    let user = register_and_login(&app, "erin").await;

    let response = client
        .get(app.api_url("/users/profile"))
        .header("x-auth-token", &user.token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["username"], "erin");
}
