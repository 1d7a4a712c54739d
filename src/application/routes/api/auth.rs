use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::users::{NewUser, UserSummary};
use crate::infrastructure::auth::{hash_password, verify_password};

/// Minimum accepted password length, matching the original client's rule.
const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginResponse {
    token: String,
    user: UserSummary,
}

#[tracing::instrument(skip(state, payload))]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::validation("username is required").into());
    }

    let email = payload.email.trim().to_lowercase();
    if !looks_like_email(&email) {
        return Err(AppError::validation("please include a valid email").into());
    }

    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        ))
        .into());
    }

    // bcrypt is deliberately slow; keep it off the async worker threads.
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&payload.password))
        .await
        .map_err(|err| AppError::unexpected(format!("hashing task failed: {err}")))?
        .map_err(|err| AppError::unexpected(format!("failed to hash password: {err}")))?;

    let user = state
        .user_repo
        .insert(NewUser::new(username, email, password_hash))
        .await
        .map_err(AppError::from)?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.summary())))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[tracing::instrument(skip(state, payload))]
pub(crate) async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    // A missing account and a wrong password are indistinguishable to the
    // caller.
    let user = state
        .user_repo
        .get_by_email(payload.email.trim())
        .await
        .map_err(|_| AppError::Unauthenticated)?;

    let password_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || {
        verify_password(&payload.password, &password_hash)
    })
    .await
    .map_err(|err| AppError::unexpected(format!("verification task failed: {err}")))?;

    if !valid {
        return Err(AppError::Unauthenticated.into());
    }

    let token = state
        .jwt_keys
        .issue(user.id)
        .map_err(|err| AppError::unexpected(err.to_string()))?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: user.summary(),
    }))
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
