use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::books::{Book, BookDetail, BookWithCreator, NewBook, UpdateBook};
use crate::domain::ids::BookId;

#[tracing::instrument(skip(state))]
pub(crate) async fn list_books(
    State(state): State<AppState>,
) -> Result<Json<Vec<BookWithCreator>>, ApiError> {
    let books = state.book_repo.list_all().await.map_err(AppError::from)?;
    Ok(Json(books))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<BookId>,
) -> Result<Json<BookDetail>, ApiError> {
    let detail = state.book_repo.get_detail(id).await.map_err(AppError::from)?;
    Ok(Json(detail))
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn create_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let new_book = payload.normalize();
    if new_book.title.is_empty() || new_book.author.is_empty() {
        return Err(AppError::validation("title and author are required").into());
    }

    let book = state
        .book_repo
        .insert(new_book, auth_user.user.id)
        .await
        .map_err(AppError::from)?;

    info!(book_id = %book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DeleteResponse {
    pub message: String,
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn update_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
    Json(payload): Json<UpdateBook>,
) -> Result<Json<Book>, ApiError> {
    let changes = payload.normalize();
    if !changes.has_changes() {
        return Err(AppError::validation("no changes provided").into());
    }

    require_owner(&state, id, &auth_user, "update").await?;

    let book = state
        .book_repo
        .update(id, changes)
        .await
        .map_err(AppError::from)?;

    info!(%id, "book updated");
    Ok(Json(book))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn delete_book(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<BookId>,
) -> Result<Json<DeleteResponse>, ApiError> {
    require_owner(&state, id, &auth_user, "delete").await?;

    state.book_repo.delete(id).await.map_err(AppError::from)?;

    info!(%id, "book deleted");
    Ok(Json(DeleteResponse {
        message: "book deleted successfully".to_string(),
    }))
}

/// Update and delete are restricted to the user who added the book.
/// Unknown books fail with `NotFound` before the ownership check runs.
async fn require_owner(
    state: &AppState,
    id: BookId,
    auth_user: &AuthenticatedUser,
    action: &str,
) -> Result<(), ApiError> {
    let book = state.book_repo.get(id).await.map_err(AppError::from)?;
    if book.added_by != auth_user.user.id {
        return Err(AppError::forbidden(format!("not authorized to {action} this book")).into());
    }
    Ok(())
}
