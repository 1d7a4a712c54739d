use reqwest::{Client, StatusCode};
use serde_json::json;

use crate::helpers::{create_book, register_and_login, spawn_app};

#[tokio::test]
async fn creating_a_book_returns_201_for_valid_data() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({
            "title": "The Left Hand of Darkness",
            "author": "Ursula K. Le Guin",
            "genre": "Science Fiction",
            "description": "A novel of Gethen"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["title"], "The Left Hand of Darkness");
    assert_eq!(body["added_by"], user.id);
    assert_eq!(body["average_rating"], 0.0);
}

#[tokio::test]
async fn creating_a_book_requires_auth() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/books"))
        .json(&json!({ "title": "Dune", "author": "Frank Herbert" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn creating_a_book_without_title_returns_400() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    let client = Client::new();

    let response = client
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({ "title": "   ", "author": "Frank Herbert" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_books_is_public_and_includes_creator() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    create_book(&app, &user, "Dune", "Science Fiction").await;
    let client = Client::new();

    let response = client
        .get(app.api_url("/books"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    let books = body.as_array().expect("body is an array");
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Dune");
    assert_eq!(books[0]["added_by"]["username"], "alice");
    assert!(books[0]["added_by"].get("password_hash").is_none());
}

#[tokio::test]
async fn getting_a_book_returns_detail_with_engagement() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    let book = create_book(&app, &user, "Dune", "Science Fiction").await;
    let client = Client::new();

    let response = client
        .get(app.api_url(&format!("/books/{}", book.id)))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["title"], "Dune");
    assert_eq!(body["ratings"], json!([]));
    assert_eq!(body["likes"], json!([]));
    assert_eq!(body["comments"], json!([]));
}

#[tokio::test]
async fn getting_an_unknown_book_returns_404() {
    let app = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(app.api_url("/books/9999"))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updating_a_book_merges_changed_fields() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    let book = create_book(&app, &user, "Dune", "Science Fiction").await;
    let client = Client::new();

    let response = client
        .put(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .json(&json!({ "description": "Spice and sand" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["title"], "Dune");
    assert_eq!(body["description"], "Spice and sand");
    assert_eq!(body["genre"], "Science Fiction");
}

#[tokio::test]
async fn updating_a_book_with_no_fields_returns_400() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    let book = create_book(&app, &user, "Dune", "Science Fiction").await;
    let client = Client::new();

    let response = client
        .put(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn updating_someone_elses_book_returns_403() {
    let app = spawn_app().await;
    let owner = register_and_login(&app, "alice").await;
    let intruder = register_and_login(&app, "mallory").await;
    let book = create_book(&app, &owner, "Dune", "Science Fiction").await;
    let client = Client::new();

    let response = client
        .put(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&intruder.token)
        .json(&json!({ "title": "Mine Now" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_someone_elses_book_returns_403() {
    let app = spawn_app().await;
    let owner = register_and_login(&app, "alice").await;
    let intruder = register_and_login(&app, "mallory").await;
    let book = create_book(&app, &owner, "Dune", "Science Fiction").await;
    let client = Client::new();

    let response = client
        .delete(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&intruder.token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_a_book_removes_it_from_listings() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    let book = create_book(&app, &user, "Dune", "Science Fiction").await;
    let client = Client::new();

    let response = client
        .delete(app.api_url(&format!("/books/{}", book.id)))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(app.api_url(&format!("/books/{}", book.id)))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_unknown_book_returns_404() {
    let app = spawn_app().await;
    let user = register_and_login(&app, "alice").await;
    let client = Client::new();

    let response = client
        .delete(app.api_url("/books/9999"))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
