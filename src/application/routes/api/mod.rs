pub(crate) mod auth;
pub(crate) mod books;
pub(crate) mod engagement;
pub(crate) mod recommendations;
pub(crate) mod search;
pub(crate) mod users;

use axum::routing::{get, post};

use crate::application::state::AppState;

pub(super) fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(search::search_books))
        .route(
            "/books/recommendations/feed",
            get(recommendations::recommendation_feed),
        )
        .route(
            "/books/{id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/{id}/rate", post(engagement::rate_book))
        .route("/books/{id}/like", post(engagement::toggle_like))
        .route("/books/{id}/comment", post(engagement::add_comment))
        .route(
            "/users/profile",
            get(users::get_own_profile).put(users::update_profile),
        )
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/follow", post(users::follow_user))
        .route("/users/{id}/unfollow", post(users::unfollow_user))
}
