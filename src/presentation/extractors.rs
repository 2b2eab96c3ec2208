use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::domain::User;
use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

/// The raw bearer token from `Authorization`.
pub struct BearerToken(pub String);

/// The signed-in user behind the bearer token. Rejects with 401.
pub struct CurrentUser(pub User);

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .map(BearerToken)
            .ok_or_else(ApiError::unauthorized)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(ApiError::unauthorized)?;
        state
            .auth
            .current_user(&token)
            .await
            .map(CurrentUser)
            .ok_or_else(ApiError::unauthorized)
    }
}
