use axum::Json;
use axum::extract::State;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::books::Book;
use crate::domain::recommendations::recommend;

/// Content-based feed: books in genres the caller has engaged with,
/// minus the books already rated or liked. See
/// [`crate::domain::recommendations`] for the ranking rules.
#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn recommendation_feed(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Json<Vec<Book>>, ApiError> {
    let engaged = state
        .book_repo
        .engaged_book_ids(auth_user.user.id)
        .await
        .map_err(AppError::from)?;

    let books = state.book_repo.list_books().await.map_err(AppError::from)?;

    Ok(Json(recommend(books, &engaged)))
}
