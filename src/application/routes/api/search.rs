use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::catalog::CatalogBook;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchQuery {
    #[serde(default)]
    query: Option<String>,
}

#[tracing::instrument(skip(state))]
pub(crate) async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Vec<CatalogBook>>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::from(AppError::validation("search query is required")))?;

    let results = state.catalog.search(query).await.map_err(AppError::from)?;
    Ok(Json(results))
}
