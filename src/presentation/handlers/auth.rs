use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::domain::UserRole;
use crate::presentation::error::ApiError;
use crate::presentation::extractors::{BearerToken, CurrentUser};
use crate::presentation::state::AppState;

use super::dto::UserResponse;

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub user: UserResponse,
}

#[tracing::instrument(skip(state, request), fields(email = %request.email))]
pub async fn sign_up_handler(
    State(state): State<AppState>,
    Json(request): Json<SignUpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let role = match request.role.as_deref() {
        None => UserRole::Client,
        Some(raw) => raw.parse::<UserRole>().map_err(ApiError::validation)?,
    };
    // Admins are provisioned out of band.
    if role == UserRole::Admin {
        return Err(ApiError::validation("role must be CLIENT or PROVIDER"));
    }

    let user = state
        .auth
        .sign_up(&request.name, &request.email, &request.password, role)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

#[tracing::instrument(skip(state, request), fields(email = %request.email))]
pub async fn sign_in_handler(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .auth
        .sign_in(&request.email, &request.password)
        .await?;

    Ok(Json(SessionResponse {
        user: UserResponse::from(&session.user),
        access_token: session.access_token,
    }))
}

pub async fn sign_out_handler(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<impl IntoResponse, ApiError> {
    state.auth.sign_out(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(UserResponse::from(&user))
}
