use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::auth::AuthenticatedUser;
use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::ids::UserId;
use crate::domain::users::{UpdateProfile, UserProfile, UserSummary};

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn get_own_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state
        .user_repo
        .get_profile(auth_user.user.id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(profile))
}

#[tracing::instrument(skip(state, auth_user, payload))]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<UpdateProfile>,
) -> Result<Json<UserSummary>, ApiError> {
    let changes = payload.normalize();
    if !changes.has_changes() {
        return Err(AppError::validation("no changes provided").into());
    }

    let user = state
        .user_repo
        .update_profile(auth_user.user.id, changes)
        .await
        .map_err(AppError::from)?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user.summary()))
}

#[tracing::instrument(skip(state))]
pub(crate) async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state.user_repo.get_profile(id).await.map_err(AppError::from)?;
    Ok(Json(profile))
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FollowResponse {
    pub message: String,
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn follow_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<UserId>,
) -> Result<Json<FollowResponse>, ApiError> {
    if id == auth_user.user.id {
        return Err(AppError::validation("you cannot follow yourself").into());
    }

    state
        .user_repo
        .follow(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;

    info!(follower = %auth_user.user.id, followed = %id, "user followed");
    Ok(Json(FollowResponse {
        message: "user followed successfully".to_string(),
    }))
}

#[tracing::instrument(skip(state, auth_user))]
pub(crate) async fn unfollow_user(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(id): Path<UserId>,
) -> Result<Json<FollowResponse>, ApiError> {
    state
        .user_repo
        .unfollow(auth_user.user.id, id)
        .await
        .map_err(AppError::from)?;

    info!(follower = %auth_user.user.id, unfollowed = %id, "user unfollowed");
    Ok(Json(FollowResponse {
        message: "user unfollowed successfully".to_string(),
    }))
}
