use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::{JobId, Price};
use crate::presentation::error::{ApiError, ErrorResponse};
use crate::presentation::state::AppState;

const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    pub job_id: String,
    pub price: f64,
    #[serde(default)]
    pub service_name: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Serialize)]
pub struct CreateCheckoutResponse {
    pub url: String,
}

fn cors_headers() -> [(axum::http::HeaderName, HeaderValue); 2] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        (
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ),
    ]
}

pub async fn create_checkout_preflight_handler() -> impl IntoResponse {
    (StatusCode::OK, cors_headers(), "ok")
}

/// Hosted-function style entry point used by the dashboard's pay button. Every
/// failure is a 400 with `{error, message}`.
#[tracing::instrument(skip_all)]
pub async fn create_checkout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateCheckoutRequest>, JsonRejection>,
) -> Response {
    let outcome = match payload {
        Ok(Json(request)) => create_checkout(&state, &headers, request).await,
        Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
    };

    match outcome {
        Ok(url) => (
            StatusCode::OK,
            cors_headers(),
            Json(CreateCheckoutResponse { url }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e.message, code = e.code, "Checkout function failed");
            (
                StatusCode::BAD_REQUEST,
                cors_headers(),
                Json(ErrorResponse {
                    error: e.code.to_string(),
                    message: e.message,
                }),
            )
                .into_response()
        }
    }
}

async fn create_checkout(
    state: &AppState,
    headers: &HeaderMap,
    request: CreateCheckoutRequest,
) -> Result<String, ApiError> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(ApiError::unauthorized)?;
    let user = state
        .auth
        .current_user(token.trim())
        .await
        .ok_or_else(ApiError::unauthorized)?;

    let job_id = request
        .job_id
        .parse::<JobId>()
        .map_err(ApiError::bad_request)?;
    let quoted = Price::from_amount(request.price).map_err(|e| ApiError::validation(e.to_string()))?;

    let job = state.lifecycle.get(&user, job_id).await?;
    if quoted != job.price {
        return Err(ApiError::validation(format!(
            "price {} does not match the job price {}",
            quoted, job.price
        )));
    }
    if let Some(name) = request.service_name.as_deref() {
        if name != job.service_type {
            tracing::debug!(requested = name, stored = %job.service_type, "Using stored service name");
        }
    }

    let session = state
        .lifecycle
        .initiate_payment(&user, job_id, &request.success_url, &request.cancel_url)
        .await?;
    Ok(session.url)
}
