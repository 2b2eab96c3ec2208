use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;

use crate::domain::PaymentReturn;
use crate::presentation::error::ApiError;
use crate::presentation::extractors::CurrentUser;
use crate::presentation::state::AppState;

use super::dto::JobResponse;

pub const SIGNATURE_HEADER: &str = "stripe-signature";

#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// The browser is back from checkout. Its query names the job; whether the job
/// is paid is decided by asking the processor.
#[tracing::instrument(skip(state, user, query), fields(client_id = %user.id))]
pub async fn payment_return_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_return = PaymentReturn::from_pairs(
        query.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    )
    .map_err(ApiError::bad_request)?;

    let job = state
        .lifecycle
        .reconcile_payment_return(&user, payment_return)
        .await?;
    Ok(Json(JobResponse::from(job)))
}

/// Processor callback. Unsigned or stale payloads are rejected before parsing.
#[tracing::instrument(skip(state, headers, body), fields(bytes = body.len()))]
pub async fn payment_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("missing Stripe-Signature header"))?;

    let confirmation = state.webhook_verifier.verify(&body, signature).map_err(|e| {
        tracing::warn!(error = %e, "Webhook rejected");
        ApiError::from(e)
    })?;

    if let Some(confirmation) = confirmation {
        state.lifecycle.confirm_payment(&confirmation).await?;
    }

    Ok((StatusCode::OK, Json(WebhookAck { received: true })))
}
