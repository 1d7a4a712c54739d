use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use tracing::{Span, warn};

use crate::application::errors::{ApiError, AppError};
use crate::application::state::AppState;
use crate::domain::users::User;

/// Legacy credential header carrying the raw token, honored for backward
/// compatibility with the older client.
const LEGACY_TOKEN_HEADER: &str = "x-auth-token";

/// Extractor that resolves a bearer credential to a user identity.
///
/// Accepts both `Authorization: Bearer <token>` and the legacy
/// `x-auth-token: <token>` presentation; both feed one verification path.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts).ok_or(ApiError::from(AppError::Unauthenticated))?;

        let user_id = state.jwt_keys.verify(token).map_err(|err| {
            warn!(error = %err, "token verification failed");
            ApiError::from(AppError::Unauthenticated)
        })?;

        // A token can outlive its user only if the account was removed;
        // treat that as an invalid credential rather than a 404.
        let user = state.user_repo.get(user_id).await.map_err(|err| {
            warn!(error = %err, %user_id, "user lookup failed for valid token");
            ApiError::from(AppError::Unauthenticated)
        })?;

        Span::current().record("user.id", tracing::field::display(&user.id));
        Ok(AuthenticatedUser { user })
    }
}

fn extract_token(parts: &Parts) -> Option<&str> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        let value = value.to_str().ok()?;
        return value.strip_prefix("Bearer ").map(str::trim);
    }

    parts
        .headers
        .get(LEGACY_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}
