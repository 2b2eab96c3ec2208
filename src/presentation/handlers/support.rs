use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::presentation::error::ApiError;
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct SupportRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct SupportResponse {
    pub reply: String,
}

pub async fn support_handler(
    State(state): State<AppState>,
    Json(request): Json<SupportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.message.trim().is_empty() {
        return Err(ApiError::validation("message must not be empty"));
    }
    let reply = state.support.reply(&request.message).await;
    Ok(Json(SupportResponse { reply }))
}
