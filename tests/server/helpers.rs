use bookly::application::routes::app_router;
use bookly::application::state::{AppState, AppStateConfig};
use bookly::domain::books::Book;
use bookly::infrastructure::auth::JwtKeys;
use bookly::infrastructure::catalog::GOOGLE_BOOKS_URL;
use reqwest::{Client, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::AbortHandle;

pub struct TestApp {
    pub address: String,
    #[allow(dead_code)]
    pub mock_server: Option<wiremock::MockServer>,
    server_handle: AbortHandle,
}

impl TestApp {
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.address, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_inner(GOOGLE_BOOKS_URL.to_string(), None).await
}

pub async fn spawn_app_with_catalog_mock() -> TestApp {
    let mock_server = wiremock::MockServer::start().await;
    let catalog_url = format!("{}/books/v1/volumes", mock_server.uri());
    spawn_app_inner(catalog_url, Some(mock_server)).await
}

async fn spawn_app_inner(catalog_url: String, mock_server: Option<wiremock::MockServer>) -> TestApp {
    let database = bookly::infrastructure::database::Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            jwt_keys: JwtKeys::new("test-secret", chrono::Duration::hours(1)),
            catalog_url,
        },
    );

    let app = app_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");

    let local_addr = listener.local_addr().expect("Failed to get local address");
    let address = format!("http://{}", local_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Server failed to start");
    })
    .abort_handle();

    TestApp {
        address,
        mock_server,
        server_handle,
    }
}

pub struct TestUser {
    pub id: i64,
    pub token: String,
}

/// Registers a fresh account and logs in, returning the bearer token.
pub async fn register_and_login(app: &TestApp, username: &str) -> TestUser {
    let client = Client::new();
    let email = format!("{username}@example.com");

    let response = client
        .post(app.api_url("/auth/register"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "hunter2hunter2"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "registering {username} should succeed"
    );

    let response = client
        .post(app.api_url("/auth/login"))
        .json(&json!({ "email": email, "password": "hunter2hunter2" }))
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "logging in as {username} should succeed"
    );

    let body: serde_json::Value = response.json().await.expect("Failed to parse login body");
    TestUser {
        id: body["user"]["id"].as_i64().expect("login body has user id"),
        token: body["token"]
            .as_str()
            .expect("login body has token")
            .to_string(),
    }
}

pub async fn create_book(app: &TestApp, user: &TestUser, title: &str, genre: &str) -> Book {
    let client = Client::new();
    let response = client
        .post(app.api_url("/books"))
        .bearer_auth(&user.token)
        .json(&json!({
            "title": title,
            "author": "Test Author",
            "genre": genre
        }))
        .send()
        .await
        .expect("Failed to send create book request");
    assert_eq!(
        response.status(),
        StatusCode::CREATED,
        "creating book '{title}' should succeed"
    );

    response.json().await.expect("Failed to parse created book")
}

pub async fn rate_book(app: &TestApp, user: &TestUser, book_id: i64, rating: f64) {
    let client = Client::new();
    let response = client
        .post(app.api_url(&format!("/books/{book_id}/rate")))
        .bearer_auth(&user.token)
        .json(&json!({ "rating": rating }))
        .send()
        .await
        .expect("Failed to send rate request");
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "rating book {book_id} should succeed"
    );
}

pub async fn like_book(app: &TestApp, user: &TestUser, book_id: i64) {
    let client = Client::new();
    let response = client
        .post(app.api_url(&format!("/books/{book_id}/like")))
        .bearer_auth(&user.token)
        .send()
        .await
        .expect("Failed to send like request");
    assert_eq!(
        response.status(),
        StatusCode::OK,
        "liking book {book_id} should succeed"
    );
}
