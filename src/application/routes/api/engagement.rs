use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::info;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::books::{
    Comment, LikeState, MAX_RATING, MIN_RATING, RatingSummary, rating_in_range,
};
use crate::domain::ids::BookId;

#[derive(Debug, Deserialize)]
pub(crate) struct RateRequest {
    rating: f64,
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn rate_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
    Json(payload): Json<RateRequest>,
) -> Result<Json<RatingSummary>, ApiError> {
    if !rating_in_range(payload.rating) {
        return Err(AppError::validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}"
        ))
        .into());
    }

    let summary = state
        .book_repo
        .rate(id, auth_user.user.id, payload.rating)
        .await
        .map_err(AppError::from)?;

    info!(book_id = %id, rating = payload.rating, "book rated");
    Ok(Json(summary))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
) -> Result<Json<LikeState>, ApiError> {
    let like_state = state
        .book_repo
        .toggle_like(id, auth_user.user.id)
        .await
        .map_err(AppError::from)?;

    info!(book_id = %id, liked = like_state.liked, "like toggled");
    Ok(Json(like_state))
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentRequest {
    text: String,
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<Vec<Comment>>, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(AppError::validation("comment text is required").into());
    }

    let comments = state
        .book_repo
        .add_comment(id, auth_user.user.id, text)
        .await
        .map_err(AppError::from)?;

    info!(book_id = %id, "comment added");
    Ok(Json(comments))
}
